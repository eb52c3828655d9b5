use super::{copy_label, load};
use crate::cli::StructureArgs;
use crate::error::Result;
use tracing::info;
use xtalkit::core::models::elements;
use xtalkit::core::models::structure::Structure;
use xtalkit::engine::progress::{CancellationToken, ProgressReporter};
use xtalkit::workflows::{bonds, lattice, symmetry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Supercell,
    Wrap,
    Desymmetrize,
    Shift,
}

pub fn run(transform: Transform, args: StructureArgs) -> Result<()> {
    let (mut structure, policy) = load(&args)?;
    symmetry::expand_symmetry(&mut structure);
    bonds::recompute_bonds_with(
        &mut structure,
        &policy,
        &CancellationToken::new(),
        &ProgressReporter::new(),
    );

    info!(?transform, "Applying lattice transform.");
    let result = match transform {
        Transform::Supercell => Some(lattice::super_cell_with(&structure, &policy)?),
        Transform::Wrap => Some(lattice::wrap_atoms_to_cell_with(&structure, &policy)),
        Transform::Desymmetrize => Some(lattice::removed_symmetry_with(&structure, &policy)),
        Transform::Shift => lattice::apply_cell_content_shift_with(&structure, &policy)?,
    };
    let Some(result) = result else {
        println!("The cell has no content shift or flip; nothing changed.");
        return Ok(());
    };

    for line in summary(transform, &result) {
        println!("{line}");
    }
    Ok(())
}

fn summary(transform: Transform, structure: &Structure) -> Vec<String> {
    match transform {
        Transform::Supercell | Transform::Shift => {
            let [a, b, c] = structure.cell().lengths();
            vec![
                format!("Cell: {a:.4} x {b:.4} x {c:.4} A"),
                format!(
                    "{} atom(s), {} copies, {} bond(s).",
                    structure.atom_count(),
                    structure.copy_count(),
                    structure.bonds().len()
                ),
            ]
        }
        Transform::Wrap => structure
            .copies_iter()
            .map(|(id, copy)| {
                let f = structure.to_fractional(&copy.position);
                format!(
                    "{:<10} {:>9.5} {:>9.5} {:>9.5}",
                    copy_label(structure, id),
                    f.x,
                    f.y,
                    f.z
                )
            })
            .collect(),
        Transform::Desymmetrize => structure
            .atoms_iter()
            .map(|(_, atom)| {
                let p = atom.position;
                format!(
                    "{:<8} {:<3} {:>9.5} {:>9.5} {:>9.5} {:>5.2}",
                    atom.display_name,
                    elements::symbol(atom.element),
                    p.x,
                    p.y,
                    p.z,
                    atom.occupancy
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn crystal_input(dir: &TempDir, extra_cell: &str) -> StructureArgs {
        let input = dir.path().join("crystal.toml");
        let content = format!(
            r#"
            kind = "crystal"
            space-group = 2
            [cell]
            lengths = [10.0, 10.0, 10.0]
            {extra_cell}
            [[atoms]]
            element = "C"
            position = [0.1, 0.2, 0.3]
            name = "C1"
            "#
        );
        fs::write(&input, content).unwrap();
        StructureArgs {
            input,
            config: None,
        }
    }

    fn transformed(args: &StructureArgs, transform: Transform) -> Option<Structure> {
        let (mut structure, policy) = load(args).unwrap();
        symmetry::expand_symmetry(&mut structure);
        match transform {
            Transform::Supercell => lattice::super_cell_with(&structure, &policy).ok(),
            Transform::Wrap => Some(lattice::wrap_atoms_to_cell_with(&structure, &policy)),
            Transform::Desymmetrize => Some(lattice::removed_symmetry_with(&structure, &policy)),
            Transform::Shift => lattice::apply_cell_content_shift_with(&structure, &policy).unwrap(),
        }
    }

    #[test]
    fn every_transform_runs_on_a_symmetric_crystal() {
        let dir = tempdir().unwrap();
        let args = crystal_input(&dir, "maximum-replica = [1, 1, 0]\ncontent-shift = [0.5, 0.0, 0.0]");
        for transform in [
            Transform::Supercell,
            Transform::Wrap,
            Transform::Desymmetrize,
            Transform::Shift,
        ] {
            assert!(run(transform, args.clone()).is_ok(), "{transform:?} failed");
        }
    }

    #[test]
    fn supercell_summary_reports_the_enlarged_cell() {
        let dir = tempdir().unwrap();
        let args = crystal_input(&dir, "maximum-replica = [1, 0, 0]");
        let result = transformed(&args, Transform::Supercell).unwrap();

        let lines = summary(Transform::Supercell, &result);
        assert_eq!(lines[0], "Cell: 20.0000 x 10.0000 x 10.0000 A");
        assert!(lines[1].starts_with("4 atom(s), 4 copies"));
    }

    #[test]
    fn desymmetrize_lists_one_line_per_copy() {
        let dir = tempdir().unwrap();
        let args = crystal_input(&dir, "");
        let result = transformed(&args, Transform::Desymmetrize).unwrap();

        let lines = summary(Transform::Desymmetrize, &result);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.starts_with("C1")));
    }

    #[test]
    fn wrap_prints_fractional_positions() {
        let dir = tempdir().unwrap();
        let args = crystal_input(&dir, "");
        let result = transformed(&args, Transform::Wrap).unwrap();

        let lines = summary(Transform::Wrap, &result);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("0.90000"));
        assert!(lines[1].starts_with("C1#2"));
    }

    #[test]
    fn shift_without_content_shift_changes_nothing() {
        let dir = tempdir().unwrap();
        let args = crystal_input(&dir, "");
        assert!(transformed(&args, Transform::Shift).is_none());
        assert!(run(Transform::Shift, args).is_ok());
    }

    #[test]
    fn policy_overrides_reach_the_transformed_bonds() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("pair.toml");
        fs::write(
            &input,
            r#"
            kind = "crystal"
            [cell]
            lengths = [30.0, 30.0, 30.0]
            [[atoms]]
            element = "C"
            position = [0.1, 0.5, 0.5]
            [[atoms]]
            element = "C"
            position = [0.18, 0.5, 0.5]
            "#,
        )
        .unwrap();
        let config = dir.path().join("policy.toml");
        fs::write(&config, "[bonding]\nbond-tolerance-offset = 1.0\n").unwrap();

        let preset = StructureArgs {
            input: input.clone(),
            config: None,
        };
        let overridden = StructureArgs {
            input,
            config: Some(config),
        };
        let bonds = |args: &StructureArgs| {
            transformed(args, Transform::Desymmetrize)
                .unwrap()
                .bonds()
                .len()
        };
        assert_eq!(bonds(&preset), 0);
        assert_eq!(bonds(&overridden), 1);
    }

    #[test]
    fn missing_input_is_reported() {
        let args = StructureArgs {
            input: PathBuf::from("/nonexistent/structure.toml"),
            config: None,
        };
        assert!(run(Transform::Wrap, args).is_err());
    }
}
