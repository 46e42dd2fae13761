use crate::actions::{ItemAction, ShellCommand};
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use ringmenu::{IconName, Label};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[strum(serialize = "North", serialize = "n", serialize = "0")]
    North,
    #[strum(serialize = "NorthEast", serialize = "ne", serialize = "1")]
    NorthEast,
    #[strum(serialize = "East", serialize = "e", serialize = "2")]
    East,
    #[strum(serialize = "SouthEast", serialize = "se", serialize = "3")]
    SouthEast,
    #[strum(serialize = "South", serialize = "s", serialize = "4")]
    South,
    #[strum(serialize = "SouthWest", serialize = "sw", serialize = "5")]
    SouthWest,
    #[strum(serialize = "West", serialize = "w", serialize = "6")]
    West,
    #[strum(serialize = "NorthWest", serialize = "nw", serialize = "7")]
    NorthWest,
}

impl Direction {
    pub fn as_index(&self) -> usize {
        *self as usize
    }

    /// Menu-space angle: north points up, compass order runs clockwise.
    pub fn angle(&self) -> f64 {
        FRAC_PI_2 - self.as_index() as f64 * FRAC_PI_4
    }
}

/// A compass point, or a menu-space angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Heading {
    Compass(Direction),
    Degrees(f64),
}

impl Heading {
    pub fn radians(&self) -> f64 {
        match self {
            Self::Compass(dir) => dir.angle(),
            Self::Degrees(deg) => deg.to_radians(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MenuConfig {
    pub dead_zone: f64,
    pub first_radius: f64,
    pub ring_spacing: f64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            dead_zone: 40.0,
            first_radius: ringmenu::DEFAULT_RADIUS,
            ring_spacing: ringmenu::DEFAULT_RING_SPACING,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpringConfig {
    /// Elastic constant.
    pub spring: f64,
    /// Rest length in degrees; uniform spacing when absent.
    pub rest: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ItemConfig {
    pub label: Option<Label>,
    pub icon: Option<IconName>,
    pub selected_icon: Option<IconName>,
    pub exec: Option<ShellCommand>,
    pub print: Option<String>,
    pub tag: Option<i64>,
}

impl ItemConfig {
    pub fn action(&self) -> Option<ItemAction> {
        self.exec
            .clone()
            .map(ItemAction::Exec)
            .or_else(|| self.print.clone().map(ItemAction::Print))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SlotConfig {
    Spring(SpringConfig),
    Item(ItemConfig),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupConfig {
    pub toward: Heading,
    pub start: usize,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RingConfig {
    pub radius: Option<f64>,
    pub gravity: Option<Heading>,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
    #[serde(default)]
    pub slots: Vec<SlotConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub rings: Vec<RingConfig>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Ring {ring}, slot {slot}: item needs a label or an icon")]
    EmptyItem { ring: usize, slot: usize },
    #[error("Menu settings: {0}")]
    Settings(#[source] ringmenu::MenuError),
    #[error("Ring {ring}: {source}")]
    Menu {
        ring: usize,
        #[source]
        source: ringmenu::MenuError,
    },
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "ringpop", "ringpop").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("RINGPOP").separator("__"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn builtin_config() -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from_str(
            DEFAULT_CONFIG,
            config::FileFormat::Toml,
        ))
        .build()?;
    Ok(s.try_deserialize()?)
}

pub fn load_or_default() -> Config {
    let user = match get_config_path() {
        Ok(path) if path.exists() => Some(load_config()),
        _ => None,
    };

    match user {
        Some(Ok(c)) => c,
        other => {
            if let Some(Err(e)) = other {
                log::error!("Failed to load config, using built-in menu: {}", e);
            }
            builtin_config().unwrap_or_else(|e| {
                log::error!("Built-in config is invalid: {}", e);
                Config::default()
            })
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", ConfigError::from(e));
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
