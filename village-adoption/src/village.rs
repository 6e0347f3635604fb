use crate::error::{AdoptionError, Result};
use csv::{ReaderBuilder, WriterBuilder};
use petgraph::graph::{NodeIndex, UnGraph};
use rand::{thread_rng, Rng};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// File name the village data set uses for a village's adjacency matrix.
pub fn adjacency_file_name(village: u32) -> String {
    format!("adj_allVillageRelationships_HH_vilno_{}.csv", village)
}

/// Household relationship network of one village.
///
/// Node weights are household indices, so `graph[NodeIndex::new(i)] == i`.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct VillageNetwork {
    graph: UnGraph<usize, ()>,
}

impl VillageNetwork {
    /// Builds the network from a square adjacency matrix.
    ///
    /// Any positive entry in either direction links the two households.
    /// Diagonal entries are ignored.
    pub fn from_adjacency(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        for (row, values) in rows.iter().enumerate() {
            if values.len() != n {
                return Err(AdoptionError::NonSquareAdjacency {
                    row,
                    len: values.len(),
                    expected: n,
                });
            }
            if let Some((col, &value)) = values
                .iter()
                .enumerate()
                .find(|(_, v)| !v.is_finite() || **v < 0.0)
            {
                return Err(AdoptionError::InvalidAdjacencyEntry { row, col, value });
            }
        }

        let mut graph = UnGraph::with_capacity(n, 0);
        for household in 0..n {
            graph.add_node(household);
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if rows[i][j] > 0.0 || rows[j][i] > 0.0 {
                    graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), ());
                }
            }
        }

        debug!(
            households = graph.node_count(),
            relationships = graph.edge_count(),
            "Built village network"
        );
        Ok(VillageNetwork { graph })
    }

    /// Reads a headerless, comma-delimited adjacency matrix.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?
            .into_records()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Rows parse independently; collecting an indexed parallel iterator keeps row order.
        let rows = records
            .par_iter()
            .enumerate()
            .map(|(row, record)| {
                record
                    .iter()
                    .enumerate()
                    .map(|(col, field)| {
                        let field = field.trim();
                        field.parse::<f64>().map_err(|_| AdoptionError::InvalidNumber {
                            row,
                            col,
                            value: field.to_string(),
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let network = Self::from_adjacency(&rows)?;
        info!(
            path = %path.display(),
            households = network.household_count(),
            relationships = network.relationship_count(),
            "Loaded village adjacency matrix"
        );
        Ok(network)
    }

    pub fn household_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn relationship_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn graph(&self) -> &UnGraph<usize, ()> {
        &self.graph
    }

    /// Neighbouring household indices of `household`.
    pub fn neighbors(&self, household: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph
            .neighbors(NodeIndex::new(household))
            .map(|n| n.index())
    }
}

/// Writes a random symmetric 0/1 adjacency matrix with up to `links`
/// distinct relationships between `households` households.
pub fn generate_village_csv<P: AsRef<Path>>(
    households: usize,
    links: usize,
    path: P,
) -> Result<()> {
    let mut matrix = vec![vec![0u8; households]; households];
    if households > 1 {
        let mut rng = thread_rng();
        for _ in 0..links {
            let a = rng.gen_range(0..households);
            let b = rng.gen_range(0..households);
            if a != b {
                matrix[a][b] = 1;
                matrix[b][a] = 1;
            }
        }
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path.as_ref())?;
    for row in &matrix {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
