use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::data::models::PlayerProfile;

/// Price sports hypotheticals as calibrated probabilities and American odds
#[derive(Parser, Debug, Clone)]
#[command(name = "whatif-odds", version, about)]
pub struct Config {
    /// Free-text hypothetical, e.g. "Josh Allen throws 40 touchdowns this season"
    pub prompt: Option<String>,

    /// Player the prompt is about (overrides name detection)
    #[arg(long)]
    pub player: Option<String>,

    /// Player position label (QB, RB, WR, TE, K, ...)
    #[arg(long)]
    pub position: Option<String>,

    /// Player age in years
    #[arg(long)]
    pub age: Option<u32>,

    /// Completed NFL seasons
    #[arg(long)]
    pub years_exp: Option<u32>,

    /// Team abbreviation
    #[arg(long)]
    pub team: Option<String>,

    /// Reference date for staleness (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Calibration overrides (JSON file)
    #[arg(long, env = "CALIBRATION_PATH")]
    pub calibration: Option<PathBuf>,

    /// Quarterback season dataset (JSON)
    #[arg(long, env = "QB_DATASET_PATH")]
    pub qb_dataset: Option<PathBuf>,

    /// Skill-position season dataset (JSON)
    #[arg(long, env = "SKILL_DATASET_PATH")]
    pub skill_dataset: Option<PathBuf>,

    /// Print a career outlook for --player instead of pricing a prompt
    #[arg(long, default_value = "false")]
    pub career: bool,

    /// Serve the JSON API instead of answering one prompt
    #[arg(long, env = "SERVE", default_value = "false")]
    pub serve: bool,

    /// HTTP listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    pub listen_addr: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.serve {
            if self.prompt.is_some() || self.career {
                anyhow::bail!("--serve takes no prompt and cannot be combined with --career");
            }
            return Ok(());
        }
        if self.career {
            if self.player.is_none() {
                anyhow::bail!("--career needs --player");
            }
            if self.prompt.is_some() {
                anyhow::bail!("--career takes no prompt");
            }
        } else if self.prompt.as_deref().map_or(true, |p| p.trim().is_empty()) {
            anyhow::bail!("a prompt is required (or use --career / --serve)");
        }
        if self.player.is_none()
            && (self.position.is_some() || self.age.is_some() || self.years_exp.is_some() || self.team.is_some())
        {
            anyhow::bail!("--position, --age, --years-exp and --team describe a --player");
        }
        if let Some(age) = self.age {
            if !(18..=60).contains(&age) {
                anyhow::bail!("age must be between 18 and 60");
            }
        }
        Ok(())
    }

    /// The profile described by the player flags, if any.
    pub fn profile(&self) -> Option<PlayerProfile> {
        let name = self.player.clone()?;
        Some(PlayerProfile {
            name,
            position: self.position.clone().unwrap_or_default(),
            age: self.age,
            years_exp: self.years_exp,
            team_abbr: self.team.clone(),
        })
    }
}
