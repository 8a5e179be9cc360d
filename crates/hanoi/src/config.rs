use anyhow::{Context, Result};
use hanoi_core::{
    progress::ProgressStyle,
    scene::DiskLayout,
    sequencer::{Resolution, SequencerConfig},
    trajectory::{Coord, DEFAULT_LIFT_HEIGHT},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Largest tower a run will accept (about a million moves).
pub const MAX_DISKS: u32 = 20;

/// Main configuration for a simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Run parameters
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Scene geometry
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Progress and occupancy options
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Run parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of disks in the starting tower
    #[serde(default = "default_disk_count")]
    pub disk_count: u32,

    /// Seconds between consecutive moves
    #[serde(default = "default_move_delay")]
    pub move_delay: f64,

    /// Ticks per second in real-time mode, and the fixed step in headless mode
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            disk_count: default_disk_count(),
            move_delay: default_move_delay(),
            frame_rate: default_frame_rate(),
        }
    }
}

/// Scene geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_disk_height")]
    pub disk_height: f64,

    #[serde(default = "default_min_disk_width")]
    pub min_disk_width: f64,

    #[serde(default = "default_disk_width_increment")]
    pub disk_width_increment: f64,

    /// Clearance added above a disk when it is lifted off its peg
    #[serde(default = "default_lift_height")]
    pub lift_height: f64,

    /// Reference points of pegs 0, 1 and 2 as `[x, y, z]`
    #[serde(default = "default_pegs")]
    pub pegs: [[f64; 3]; 3],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            disk_height: default_disk_height(),
            min_disk_width: default_min_disk_width(),
            disk_width_increment: default_disk_width_increment(),
            lift_height: default_lift_height(),
            pegs: default_pegs(),
        }
    }
}

/// Progress and occupancy options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub progress_style: ProgressStyle,

    #[serde(default)]
    pub resolution: Resolution,
}

fn default_disk_count() -> u32 {
    3
}

fn default_move_delay() -> f64 {
    1.0
}

fn default_frame_rate() -> f64 {
    60.0
}

fn default_disk_height() -> f64 {
    DiskLayout::default().disk_height
}

fn default_min_disk_width() -> f64 {
    DiskLayout::default().min_width
}

fn default_disk_width_increment() -> f64 {
    DiskLayout::default().width_increment
}

fn default_lift_height() -> f64 {
    DEFAULT_LIFT_HEIGHT
}

fn default_pegs() -> [[f64; 3]; 3] {
    SequencerConfig::default().pegs.map(|c| [c.x, c.y, c.z])
}

impl Config {
    /// Load configuration from a file, auto-detecting TOML or JSON format
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content).or_else(|_| Self::from_json(&content)),
        }
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse config as TOML")
    }

    /// Parse configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse config as JSON")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.disk_count > MAX_DISKS {
            anyhow::bail!(
                "simulation.disk_count must be at most {MAX_DISKS}, got {}",
                sim.disk_count
            );
        }
        if !sim.frame_rate.is_finite() || sim.frame_rate <= 0.0 {
            anyhow::bail!("simulation.frame_rate must be positive");
        }
        if !self.layout.min_disk_width.is_finite() || self.layout.min_disk_width < 0.0 {
            anyhow::bail!("layout.min_disk_width cannot be negative");
        }
        if !self.layout.disk_width_increment.is_finite() || self.layout.disk_width_increment < 0.0 {
            anyhow::bail!("layout.disk_width_increment cannot be negative");
        }

        // delay, heights and pegs are checked by the sequencer itself
        self.sequencer_config()
            .validate()
            .context("invalid simulation settings")?;
        Ok(())
    }

    pub fn sequencer_config(&self) -> SequencerConfig {
        let layout = &self.layout;
        SequencerConfig {
            move_delay: self.simulation.move_delay,
            lift_height: layout.lift_height,
            layout: DiskLayout {
                disk_height: layout.disk_height,
                min_width: layout.min_disk_width,
                width_increment: layout.disk_width_increment,
            },
            pegs: layout.pegs.map(|[x, y, z]| Coord::new(x, y, z)),
            resolution: self.display.resolution,
            style: self.display.progress_style,
        }
    }

    /// Seconds per tick.
    pub fn frame_time(&self) -> f64 {
        1.0 / self.simulation.frame_rate
    }
}
