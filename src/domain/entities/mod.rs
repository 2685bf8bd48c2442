mod answer;
mod collection;
mod document;
mod embedding;

pub use answer::{Answer, IngestReceipt, RetrievedContext};
pub use collection::{CollectionSpec, DistanceMetric};
pub use document::{
    point_id, zip_points, ChunkPayload, Document, PointPayload, ScoredPoint, StoredPoint,
};
pub use embedding::Embedding;
