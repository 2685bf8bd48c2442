use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::{
    ports::{check_dimension, VectorStore},
    zip_points, ChunkPayload, CollectionSpec, DistanceMetric, DomainError, Embedding,
    PointPayload, ScoredPoint,
};

type Point = (String, Embedding, PointPayload);

struct Collection {
    spec: CollectionSpec,
    points: Vec<Point>,
    /// Position of each id in `points`.
    index: HashMap<String, usize>,
}

impl Collection {
    fn new(spec: CollectionSpec) -> Self {
        Self {
            spec,
            points: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn put(&mut self, point: Point) {
        match self.index.get(&point.0) {
            Some(&pos) => self.points[pos] = point,
            None => {
                self.index.insert(point.0.clone(), self.points.len());
                self.points.push(point);
            }
        }
    }

    fn retain(&mut self, keep: impl Fn(&Point) -> bool) {
        self.points.retain(|p| keep(p));
        self.index = self
            .points
            .iter()
            .enumerate()
            .map(|(pos, (id, _, _))| (id.clone(), pos))
            .collect();
    }
}

/// Process-local store. Points keep insertion order, which is also the
/// tie-break order for equal scores; re-upserting an id replaces it in place.
pub struct InMemoryVectorStore {
    spec: CollectionSpec,
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    pub fn new(spec: CollectionSpec) -> Self {
        let mut collections = HashMap::new();
        collections.insert(spec.name.clone(), Collection::new(spec.clone()));

        Self {
            spec,
            collections: RwLock::new(collections),
        }
    }

    fn score(distance: DistanceMetric, query: &Embedding, vector: &Embedding) -> f32 {
        match distance {
            DistanceMetric::Cosine => query.cosine_similarity(vector),
            DistanceMetric::Dot => query.dot(vector),
            DistanceMetric::Euclid => query.euclidean_distance(vector),
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        distance: DistanceMetric,
    ) -> Result<(), DomainError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::vector_store(e.to_string()))?;

        if let Some(existing) = collections.get(name) {
            if existing.spec.dimension != dimension || existing.spec.distance != distance {
                return Err(DomainError::vector_store(format!(
                    "collection '{name}' exists with dimension {} ({:?}), requested {dimension} ({distance:?})",
                    existing.spec.dimension, existing.spec.distance
                )));
            }
            return Ok(());
        }

        collections.insert(
            name.to_string(),
            Collection::new(CollectionSpec::new(name, dimension, distance)),
        );
        Ok(())
    }

    async fn upsert(
        &self,
        ids: &[String],
        vectors: &[Embedding],
        payloads: &[ChunkPayload],
    ) -> Result<(), DomainError> {
        let points = zip_points(ids, vectors, payloads)?;
        for point in &points {
            check_dimension(&self.spec, &point.vector)?;
        }

        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::vector_store(e.to_string()))?;
        let collection = collections
            .get_mut(&self.spec.name)
            .ok_or_else(|| DomainError::vector_store("collection not found"))?;

        for point in points {
            collection.put((point.id, point.vector, PointPayload::from(point.payload)));
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<ScoredPoint>, DomainError> {
        check_dimension(&self.spec, query)?;

        let collections = self
            .collections
            .read()
            .map_err(|e| DomainError::vector_store(e.to_string()))?;
        let collection = collections
            .get(&self.spec.name)
            .ok_or_else(|| DomainError::vector_store("collection not found"))?;

        let distance = collection.spec.distance;
        let mut results: Vec<ScoredPoint> = collection
            .points
            .iter()
            .map(|(id, vector, payload)| ScoredPoint {
                id: id.clone(),
                score: Self::score(distance, query, vector),
                payload: payload.clone(),
            })
            .collect();

        // Euclid scores are distances: smaller ranks first.
        match distance {
            DistanceMetric::Euclid => results.sort_by(|a, b| {
                a.score
                    .partial_cmp(&b.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            _ => results.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
        }
        results.truncate(top_k);

        Ok(results)
    }

    async fn delete_by_source(&self, source_id: &str) -> Result<(), DomainError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::vector_store(e.to_string()))?;

        if let Some(collection) = collections.get_mut(&self.spec.name) {
            collection.retain(|(_, _, payload)| payload.source_id.as_deref() != Some(source_id));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        self.collections
            .read()
            .map(|_| ())
            .map_err(|e| DomainError::vector_store(e.to_string()))
    }

    fn collection(&self) -> &CollectionSpec {
        &self.spec
    }
}

#[cfg(test)]
impl InMemoryVectorStore {
    /// Snapshot of the bound collection in storage order.
    pub fn points(&self) -> Result<Vec<Point>, DomainError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| DomainError::vector_store(e.to_string()))?;
        Ok(collections
            .get(&self.spec.name)
            .map(|c| c.points.clone())
            .unwrap_or_default())
    }

    pub fn len(&self) -> Result<usize, DomainError> {
        Ok(self.points()?.len())
    }

    pub fn ids(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.points()?.into_iter().map(|(id, _, _)| id).collect())
    }

    /// Writes a point with an arbitrary payload, bypassing upsert validation,
    /// to simulate points written by other tools.
    pub fn insert_point(
        &self,
        id: impl Into<String>,
        vector: Embedding,
        payload: PointPayload,
    ) -> Result<(), DomainError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::vector_store(e.to_string()))?;
        if let Some(collection) = collections.get_mut(&self.spec.name) {
            collection.put((id.into(), vector, payload));
        }
        Ok(())
    }
}
