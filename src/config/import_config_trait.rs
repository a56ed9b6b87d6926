// ==========================================
// Fleet Import - Import Config Reader Trait
// ==========================================
// Read-only configuration consumed by the import pipeline
// Implementor: ConfigManager (file + environment backed)
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== Date parsing =====

    /// Inclusive year window accepted by the date normalizer
    ///
    /// # Default
    /// - (1900, 2100)
    async fn get_date_year_range(&self) -> Result<(i32, i32), Box<dyn Error + Send + Sync>>;

    /// Two-digit year pivot: below → 2000s, at or above → 1900s
    ///
    /// # Default
    /// - 50
    async fn get_two_digit_year_pivot(&self) -> Result<i32, Box<dyn Error + Send + Sync>>;

    /// Exclusive bounds for numbers treated as Excel serial dates
    ///
    /// # Default
    /// - (1, 100000)
    async fn get_excel_serial_range(&self) -> Result<(f64, f64), Box<dyn Error + Send + Sync>>;

    // ===== Validation =====

    /// Allowed gap between valor_total and litros × valor_unitario
    ///
    /// # Default
    /// - 0.05
    async fn get_fuel_total_tolerance(&self) -> Result<f64, Box<dyn Error + Send + Sync>>;

    /// Oldest plausible vehicle model year
    ///
    /// # Default
    /// - 1950
    async fn get_min_vehicle_year(&self) -> Result<i32, Box<dyn Error + Send + Sync>>;

    /// Whether deliveries may auto-create vehicles that are not in the cache
    ///
    /// # Default
    /// - false
    async fn get_allow_vehicle_auto_create(&self) -> Result<bool, Box<dyn Error + Send + Sync>>;

    // ===== Structure =====

    /// Maximum number of "assembler N" columns folded per delivery row
    ///
    /// # Default
    /// - 7
    async fn get_max_assembler_columns(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;

    /// Upper bound on uploaded file size in bytes
    ///
    /// # Default
    /// - 20 MiB
    async fn get_max_file_size_bytes(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;
}
