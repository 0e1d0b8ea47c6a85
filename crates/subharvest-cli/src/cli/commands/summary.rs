//! `subharvest summary` – report on the persisted master dataset.

use anyhow::{Context, Result};
use subharvest_core::config::HarvestConfig;
use subharvest_core::dataset::{MasterDataset, Summary, TableStore, XlsxStore};

pub fn run_summary(cfg: &HarvestConfig) -> Result<()> {
    let path = cfg.master_path();
    let store = XlsxStore::new(cfg.languages.clone());
    let records = store
        .load(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    match records {
        Some(records) => {
            let master = MasterDataset::from_records(records);
            println!("{}", Summary::from_dataset(&master, &cfg.languages));
        }
        None => println!("No master dataset at {}.", path.display()),
    }
    Ok(())
}
