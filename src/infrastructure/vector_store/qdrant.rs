use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{debug, info};

use crate::domain::{
    ports::{check_dimension, VectorStore},
    zip_points, ChunkPayload, CollectionSpec, DistanceMetric, DomainError, Embedding,
    PointPayload, ScoredPoint,
};
use crate::infrastructure::config::VectorStoreConfig;

pub struct QdrantVectorStore {
    client: Qdrant,
    spec: CollectionSpec,
    timeout: Duration,
}

impl QdrantVectorStore {
    /// Connects and makes sure the configured collection exists with the
    /// given vector size.
    pub async fn connect(config: &VectorStoreConfig, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(&config.url)
            .api_key(config.api_key.clone())
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .build()
            .map_err(|e| DomainError::vector_store(e.to_string()))?;

        let store = Self {
            client,
            spec: CollectionSpec::new(&config.collection, dimension, config.distance),
            timeout: config.timeout(),
        };

        store
            .ensure_collection(&store.spec.name, dimension, config.distance)
            .await?;

        Ok(store)
    }

    fn to_qdrant(distance: DistanceMetric) -> Distance {
        match distance {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Dot => Distance::Dot,
            DistanceMetric::Euclid => Distance::Euclid,
        }
    }

    async fn call<T, E: std::fmt::Display>(
        &self,
        op: &str,
        fut: impl std::future::Future<Output = Result<T, E>>,
    ) -> Result<T, DomainError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| DomainError::vector_store(format!("{op}: {e}"))),
            Err(_) => Err(DomainError::vector_store(format!(
                "{op}: timed out after {:?}",
                self.timeout
            ))),
        }
    }

    fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
        payload.get(key)?.as_str().map(|s| s.to_string())
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        distance: DistanceMetric,
    ) -> Result<(), DomainError> {
        let collections = self
            .call("list collections", self.client.list_collections())
            .await?;

        let exists = collections.collections.iter().any(|c| c.name == name);

        if !exists {
            self.call(
                "create collection",
                self.client.create_collection(
                    CreateCollectionBuilder::new(name).vectors_config(VectorParamsBuilder::new(
                        dimension as u64,
                        Self::to_qdrant(distance),
                    )),
                ),
            )
            .await?;
            info!(collection = name, dimension, ?distance, "created qdrant collection");
            return Ok(());
        }

        let info = self
            .call("collection info", self.client.collection_info(name))
            .await?;
        let params = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config);

        match params {
            Some(VectorsConfigKind::Params(params)) => {
                if params.size != dimension as u64
                    || params.distance != Self::to_qdrant(distance) as i32
                {
                    return Err(DomainError::vector_store(format!(
                        "collection '{name}' exists with size {} and distance {}, requested {dimension} ({distance:?})",
                        params.size, params.distance
                    )));
                }
            }
            _ => {
                return Err(DomainError::vector_store(format!(
                    "collection '{name}' does not use a single unnamed vector"
                )))
            }
        }

        debug!(collection = name, "qdrant collection already exists");
        Ok(())
    }

    async fn upsert(
        &self,
        ids: &[String],
        vectors: &[Embedding],
        payloads: &[ChunkPayload],
    ) -> Result<(), DomainError> {
        let points = zip_points(ids, vectors, payloads)?;
        if points.is_empty() {
            return Ok(());
        }

        let mut structs = Vec::with_capacity(points.len());
        for point in points {
            check_dimension(&self.spec, &point.vector)?;

            let payload: Payload = serde_json::json!({
                "source_id": point.payload.source_id,
                "text": point.payload.text,
            })
            .try_into()
            .map_err(|_| DomainError::vector_store("Failed to create payload"))?;

            structs.push(PointStruct::new(point.id, point.vector.into_inner(), payload));
        }

        let count = structs.len();
        self.call(
            "upsert",
            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.spec.name, structs).wait(true)),
        )
        .await?;

        debug!(collection = %self.spec.name, count, "upserted points");
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<ScoredPoint>, DomainError> {
        check_dimension(&self.spec, query)?;

        let response = self
            .call(
                "search",
                self.client.search_points(
                    SearchPointsBuilder::new(
                        &self.spec.name,
                        query.as_slice().to_vec(),
                        top_k as u64,
                    )
                    .with_payload(true),
                ),
            )
            .await?;

        Ok(response
            .result
            .into_iter()
            .map(|scored| {
                let id = scored
                    .id
                    .as_ref()
                    .and_then(|pid| match &pid.point_id_options {
                        Some(PointIdOptions::Uuid(s)) => Some(s.clone()),
                        Some(PointIdOptions::Num(n)) => Some(n.to_string()),
                        None => None,
                    })
                    .unwrap_or_default();

                ScoredPoint {
                    id,
                    score: scored.score,
                    payload: PointPayload {
                        source_id: Self::payload_string(&scored.payload, "source_id"),
                        text: Self::payload_string(&scored.payload, "text"),
                    },
                }
            })
            .collect())
    }

    async fn delete_by_source(&self, source_id: &str) -> Result<(), DomainError> {
        let filter = Filter::must([Condition::matches("source_id", source_id.to_string())]);

        self.call(
            "delete",
            self.client.delete_points(
                DeletePointsBuilder::new(&self.spec.name)
                    .points(filter)
                    .wait(true),
            ),
        )
        .await?;

        debug!(collection = %self.spec.name, source_id, "deleted source points");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        self.call("health check", self.client.health_check())
            .await
            .map(|_| ())
    }

    fn collection(&self) -> &CollectionSpec {
        &self.spec
    }
}
