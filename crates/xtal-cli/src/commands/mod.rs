use crate::cli::StructureArgs;
use crate::config::{StructureFile, resolve_policy};
use crate::error::Result;
use std::path::Path;
use tracing::info;
use xtalkit::core::models::ids::AtomCopyId;
use xtalkit::core::models::structure::Structure;
use xtalkit::engine::config::BondingPolicy;

pub mod bonds;
pub mod transform;

/// Loads the structure description and the bonding policy named by `args`.
fn load(args: &StructureArgs) -> Result<(Structure, BondingPolicy)> {
    info!("Loading input structure from {:?}", &args.input);
    let base_dir = args.input.parent().unwrap_or(Path::new("."));
    let structure = StructureFile::from_file(&args.input)?.into_structure(base_dir)?;
    let policy = resolve_policy(args.config.as_deref(), structure.kind())?;
    Ok((structure, policy))
}

/// `NAME#k`, where `k` is the 1-based position of the copy in its parent's orbit.
fn copy_label(structure: &Structure, copy_id: AtomCopyId) -> String {
    let Some(parent) = structure.parent_of(copy_id) else {
        return "?".to_string();
    };
    match parent.copies().iter().position(|&id| id == copy_id) {
        Some(index) => format!("{}#{}", parent.display_name, index + 1),
        None => parent.display_name.clone(),
    }
}
