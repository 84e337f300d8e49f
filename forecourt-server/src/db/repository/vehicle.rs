//! Vehicle Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{AvailabilityStatus, Vehicle};

const TABLE: &str = "vehicle";

#[derive(Clone)]
pub struct VehicleRepository {
    base: BaseRepository,
}

impl VehicleRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all vehicles ordered by creation time
    pub async fn find_all(&self, limit: i64, start: i64) -> RepoResult<Vec<Vehicle>> {
        let vehicles: Vec<Vehicle> = self
            .base
            .db()
            .query("SELECT * FROM vehicle ORDER BY created_at DESC LIMIT $limit START $start")
            .bind(("limit", limit))
            .bind(("start", start))
            .await?
            .take(0)?;
        Ok(vehicles)
    }

    pub async fn count(&self) -> RepoResult<i64> {
        super::count_table(self.base.db(), "vehicle").await
    }

    /// Find vehicle by bare key
    pub async fn find_by_id(&self, key: &str) -> RepoResult<Option<Vehicle>> {
        let vehicle: Option<Vehicle> = self.base.db().select((TABLE, key)).await?;
        Ok(vehicle)
    }

    /// Find vehicle by VIN
    pub async fn find_by_vin(&self, vin: &str) -> RepoResult<Option<Vehicle>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM vehicle WHERE vin = $vin LIMIT 1")
            .bind(("vin", vin.to_string()))
            .await?;
        let vehicles: Vec<Vehicle> = result.take(0)?;
        Ok(vehicles.into_iter().next())
    }

    /// Create a new vehicle
    pub async fn create(&self, vehicle: Vehicle) -> RepoResult<Vehicle> {
        // Check duplicate VIN up front for a friendly error; the unique
        // index still backstops the race.
        if self.find_by_vin(&vehicle.vin).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Vehicle with VIN '{}' already exists",
                vehicle.vin
            )));
        }

        let created: Option<Vehicle> = self.base.db().create(TABLE).content(vehicle).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create vehicle".to_string()))
    }

    /// Set availability status directly (admin stock management)
    pub async fn set_availability(
        &self,
        key: &str,
        status: AvailabilityStatus,
        now: &str,
    ) -> RepoResult<Vehicle> {
        self.base
            .db()
            .query(
                "UPDATE type::thing('vehicle', $key) \
                 SET availability.status = $status, availability.updated_at = $now",
            )
            .bind(("key", key.to_string()))
            .bind(("status", status))
            .bind(("now", now.to_string()))
            .await?
            .check()?;

        self.find_by_id(key)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Vehicle {key} not found")))
    }
}
