//! `hogwarts list`

use anyhow::{Context, Result};

use hogwarts_core::Workspace;

pub fn run() -> Result<()> {
    let ws = Workspace::from_current_dir()?;
    let registry = ws
        .registry_dir()
        .context("hogwarts not found; run `hogwarts workspace --build hogwarts` first")?;
    let house = ws.current_house_dir()?;

    println!("hogwarts: {}", registry.display());
    println!("house:    {}", house.display());
    Ok(())
}
