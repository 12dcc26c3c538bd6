//! Lineage graph layout: commits, lanes and connectors.
//!
//! Commit logs arrive newest first. Lanes are assigned walking from the roots
//! forward, so [`LineageGraph::render`] reverses the stream before handing it
//! to [`LineageGraph::layout`]. Laying out a newest-first stream directly
//! silently flips parent/child order; the reversal is the only ordering
//! transform applied.

use crate::api::CommitGraphEntry;
use std::collections::HashMap;

/// How a connector joins a parent to its child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorKind {
    /// First-parent edge staying in one lane.
    Straight,
    /// First-parent edge where the child opened a new lane.
    Fork,
    /// Edge to a second or later parent.
    Merge,
}

/// Edge from a parent row to a child row. Rows are oldest-first indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub from_row: usize,
    pub from_lane: usize,
    pub to_row: usize,
    pub to_lane: usize,
    pub kind: ConnectorKind,
    /// Lane the edge runs in between its two rows. Never a lane holding a
    /// commit or another edge on any row in between.
    pub track: usize,
}

impl Connector {
    fn spans(&self, row: usize) -> bool {
        self.from_row < row && row < self.to_row
    }
}

/// Pick the lane for an edge between `from_row` and `to_row`.
///
/// The preferred lane is the parent's for merges and the child's otherwise;
/// when a commit or an earlier edge sits on it in between, the lowest lane
/// free over the whole span is used.
fn route(
    lanes: &[usize],
    connectors: &[Connector],
    from_row: usize,
    to_row: usize,
    preferred: usize,
) -> usize {
    let busy = |lane: usize| {
        (from_row + 1..to_row).any(|row| {
            lanes[row] == lane || connectors.iter().any(|c| c.track == lane && c.spans(row))
        })
    };
    std::iter::once(preferred)
        .chain(0..)
        .find(|&lane| !busy(lane))
        .unwrap_or(preferred)
}

/// A positioned commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub row: usize,
    pub lane: usize,
    pub entry: CommitGraphEntry,
}

/// A run of commits sharing one lane, with the branch name shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LaneSegment {
    lane: usize,
    rows: Vec<usize>,
    label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineageGraph {
    nodes: Vec<GraphNode>,
    connectors: Vec<Connector>,
    segments: Vec<LaneSegment>,
    /// Lanes crossed (not ended) at each row by connectors.
    passing: Vec<Vec<usize>>,
    lane_count: usize,
    dangling_parents: usize,
}

impl LineageGraph {
    /// Lay out a newest-first commit stream as delivered by the log.
    pub fn render(newest_first: Vec<CommitGraphEntry>) -> Self {
        let mut entries = newest_first;
        entries.reverse();
        Self::layout(entries)
    }

    /// Lay out an oldest-first commit stream.
    pub fn layout(oldest_first: Vec<CommitGraphEntry>) -> Self {
        let mut tips: Vec<Option<String>> = Vec::new();
        let mut row_of: HashMap<String, usize> = HashMap::new();
        let mut lanes: Vec<usize> = Vec::with_capacity(oldest_first.len());
        let mut segment_of_lane: HashMap<usize, usize> = HashMap::new();
        let mut segments: Vec<LaneSegment> = Vec::new();
        let mut connectors = Vec::new();
        let mut dangling_parents = 0;

        for (row, entry) in oldest_first.iter().enumerate() {
            let continued = entry
                .parents
                .first()
                .and_then(|parent| tips.iter().position(|tip| tip.as_deref() == Some(parent)));

            let lane = match continued {
                Some(lane) => lane,
                None => {
                    let lane = match tips.iter().position(Option::is_none) {
                        Some(free) => free,
                        None => {
                            tips.push(None);
                            tips.len() - 1
                        }
                    };
                    segments.push(LaneSegment {
                        lane,
                        rows: Vec::new(),
                        label: None,
                    });
                    segment_of_lane.insert(lane, segments.len() - 1);
                    lane
                }
            };
            tips[lane] = Some(entry.hash.clone());
            if let Some(&segment) = segment_of_lane.get(&lane) {
                segments[segment].rows.push(row);
            }

            for merged in entry.parents.iter().skip(1) {
                if let Some(closed) = tips.iter().position(|tip| tip.as_deref() == Some(merged)) {
                    tips[closed] = None;
                }
            }

            for (index, parent) in entry.parents.iter().enumerate() {
                let Some(&from_row) = row_of.get(parent) else {
                    dangling_parents += 1;
                    continue;
                };
                let from_lane = lanes[from_row];
                let kind = if index > 0 {
                    ConnectorKind::Merge
                } else if from_lane == lane {
                    ConnectorKind::Straight
                } else {
                    ConnectorKind::Fork
                };
                let preferred = if kind == ConnectorKind::Merge { from_lane } else { lane };
                let track = route(&lanes, &connectors, from_row, row, preferred);
                connectors.push(Connector {
                    from_row,
                    from_lane,
                    to_row: row,
                    to_lane: lane,
                    kind,
                    track,
                });
            }

            lanes.push(lane);
            row_of.insert(entry.hash.clone(), row);
        }

        for segment in &mut segments {
            segment.label = segment
                .rows
                .iter()
                .rev()
                .find_map(|&row| branch_label(&oldest_first[row].refs));
        }

        let mut passing = vec![Vec::new(); oldest_first.len()];
        for connector in &connectors {
            for row in passing
                .iter_mut()
                .take(connector.to_row)
                .skip(connector.from_row + 1)
            {
                if !row.contains(&connector.track) {
                    row.push(connector.track);
                }
            }
        }
        for row in &mut passing {
            row.sort_unstable();
        }

        let lane_count = connectors
            .iter()
            .map(|c| c.track + 1)
            .fold(tips.len(), usize::max);
        let nodes = oldest_first
            .into_iter()
            .zip(lanes)
            .enumerate()
            .map(|(row, (entry, lane))| GraphNode { row, lane, entry })
            .collect();

        Self {
            nodes,
            connectors,
            segments,
            passing,
            lane_count,
            dangling_parents,
        }
    }

    /// Nodes in layout order (oldest first).
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Nodes in display order (newest at top).
    pub fn rows_newest_first(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().rev()
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Parents referenced by some commit but missing from the input.
    pub fn dangling_parents(&self) -> usize {
        self.dangling_parents
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Lanes a connector passes through at `row` without ending there.
    pub fn passing_lanes(&self, row: usize) -> &[usize] {
        self.passing.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Label of the lane segment whose newest commit is at `row`.
    ///
    /// Each segment is labelled once, on the row drawn topmost.
    pub fn lane_label(&self, row: usize) -> Option<&str> {
        self.segments
            .iter()
            .find(|segment| segment.rows.last() == Some(&row))
            .and_then(|segment| segment.label.as_deref())
    }
}

/// Pick a branch name from `git log --decorate` style refs.
///
/// Tags and bare `HEAD` never label a lane; a local-looking name (no `/`) wins
/// over a remote-tracking one.
fn branch_label(refs: &[String]) -> Option<String> {
    let candidates: Vec<&str> = refs
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty() && !r.starts_with("tag: ") && *r != "HEAD")
        .map(|r| r.strip_prefix("HEAD -> ").unwrap_or(r))
        .collect();

    candidates
        .iter()
        .find(|name| !name.contains('/'))
        .or_else(|| candidates.first())
        .map(|name| name.to_string())
}
