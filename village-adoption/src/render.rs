//! Graphviz output for simulated periods.
//!
//! Adopting households are filled red and the rest blue. Node positions are
//! left to Graphviz.

use crate::error::Result;
use crate::runner::PeriodSnapshot;
use crate::village::VillageNetwork;
use petgraph::dot::{Config, Dot};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

pub const ADOPTER_COLOR: &str = "red";
pub const NON_ADOPTER_COLOR: &str = "blue";
const EDGE_COLOR: &str = "#d2d2d2";

/// DOT source for one period of a village.
pub fn render_dot(network: &VillageNetwork, snapshot: &PeriodSnapshot) -> String {
    let dot = format!(
        "{:?}",
        Dot::with_attr_getters(
            network.graph(),
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &|_, _| format!("color=\"{}\"", EDGE_COLOR),
            &|_, (_, household)| {
                let color = if snapshot.flags.is_adopter(*household) {
                    ADOPTER_COLOR
                } else {
                    NON_ADOPTER_COLOR
                };
                format!(
                    "label=\"{}\", shape=circle, style=filled, fillcolor=\"{}\"",
                    household, color
                )
            },
        )
    );

    // petgraph has no graph-level attributes; the title goes right after the header line.
    match dot.split_once('\n') {
        Some((header, body)) => {
            format!("{}\n    label=\"{}\"\n{}", header, snapshot.title(), body)
        }
        None => dot,
    }
}

/// Writes `period_<i>.dot` for every snapshot into `dir`.
pub fn write_period_graphs<P: AsRef<Path>>(
    network: &VillageNetwork,
    snapshots: &[PeriodSnapshot],
    dir: P,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(snapshots.len());
    for snapshot in snapshots {
        let path = dir.join(format!("period_{}.dot", snapshot.period));
        fs::write(&path, render_dot(network, snapshot))?;
        debug!(period = snapshot.period, path = %path.display(), "Wrote period graph");
        written.push(path);
    }
    info!(dir = %dir.display(), files = written.len(), "Wrote period graphs");
    Ok(written)
}

/// Runs Graphviz `dot` to turn a DOT file into a PNG.
pub fn render_png<P: AsRef<Path>, Q: AsRef<Path>>(dot_file: P, output_image: Q) -> Result<()> {
    let status = Command::new("dot")
        .arg("-Tpng")
        .arg(dot_file.as_ref())
        .arg("-o")
        .arg(output_image.as_ref())
        .status()?;
    if !status.success() {
        return Err(io::Error::other(format!("dot exited with {}", status)).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adoption::AdoptionFlags;

    fn pair() -> VillageNetwork {
        VillageNetwork::from_adjacency(&[vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap()
    }

    fn snapshot(flags: Vec<bool>) -> PeriodSnapshot {
        PeriodSnapshot {
            period: 3,
            target_fraction: 0.5,
            flags: AdoptionFlags::from(flags),
        }
    }

    #[test]
    fn colors_households_by_adoption() {
        let dot = render_dot(&pair(), &snapshot(vec![true, false]));
        assert!(dot.starts_with("graph {\n    label=\"time period-3\"\n"));
        assert!(dot.contains("label=\"0\", shape=circle, style=filled, fillcolor=\"red\""));
        assert!(dot.contains("label=\"1\", shape=circle, style=filled, fillcolor=\"blue\""));
        assert!(dot.contains("0 -- 1"));
    }

    #[test]
    fn writes_one_file_per_period() {
        let dir = tempfile::TempDir::new().unwrap();
        let snapshots = vec![
            PeriodSnapshot { period: 0, ..snapshot(vec![true, false]) },
            PeriodSnapshot { period: 1, ..snapshot(vec![true, true]) },
        ];
        let written = write_period_graphs(&pair(), &snapshots, dir.path().join("out")).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[1].ends_with("period_1.dot"));
        let second = fs::read_to_string(&written[1]).unwrap();
        assert!(!second.contains(NON_ADOPTER_COLOR));
    }
}
