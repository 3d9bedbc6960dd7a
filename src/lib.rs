use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

// --- Declare modules ---
pub mod config;
pub mod confirm;
pub mod dates;
pub mod error;
pub mod importer;
pub mod indexer;
pub mod log_form;
pub mod plan;
pub mod state;
pub mod store;

// --- Expose public types ---
pub use config::{parse_color, Config, ConfigError, StandardColor, Theme, Units};
pub use confirm::{ConfirmAction, ConfirmationFlow, Dialog, Notice, PendingConfirmation};
pub use dates::{format_date, local_today, next_monday_on_or_after, parse_date, DayColumn};
pub use error::{CoachError, FormatError, ImportError, ValidationError, ViewError};
pub use indexer::{locate, PlanPosition};
pub use log_form::LogForm;
pub use plan::{LoggedWorkoutEntry, ScheduleRow, TrainingPlan, WorkoutLog, WorkoutLogs};
pub use state::{AppState, View};
pub use store::StoreError;

/// Wires the configuration file, the database and the view controller together.
pub struct AppService {
    pub config: Config,
    pub state: AppState,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
}

impl AppService {
    /// Initializes the application service.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = store::get_store_path().context("Failed to determine database path")?;
        let conn = store::open_store(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;
        store::init_store(&conn).context("Failed to initialize database schema")?;

        let state = AppState::load(conn, local_today());

        Ok(Self {
            config,
            state,
            db_path,
            config_path,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    /// Sets the distance units and saves the config.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn set_units(&mut self, units: Units) -> Result<(), ConfigError> {
        self.config.units = units;
        self.save_config()
    }

    /// Sets the table header color and saves the config.
    /// # Errors
    /// - `ConfigError::InvalidColor` for unknown color names.
    /// - `ConfigError` variants if saving fails.
    pub fn set_header_color(&mut self, color_name: &str) -> Result<StandardColor, ConfigError> {
        let color = parse_color(color_name)?;
        self.config.theme.header_color = format!("{color:?}");
        self.save_config()?;
        Ok(color)
    }

    /// The configured header color, falling back to the default for unknown names.
    pub fn header_color(&self) -> StandardColor {
        parse_color(&self.config.theme.header_color).unwrap_or_else(|_| {
            log::warn!(
                "Unknown header color '{}' in config, using Green",
                self.config.theme.header_color
            );
            StandardColor::Green
        })
    }
}
