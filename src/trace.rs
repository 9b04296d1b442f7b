use std::io::{self, Write};

use crate::engine::TraceStep;

/// Width of the divider per table column.
const COLUMN_WIDTH: usize = 10;

/// Renders engine steps as a tab-separated table.
///
/// Nodes are numbered from 1 in the output.  The source node has no
/// `D(i),p(i)` column, so the columns run from node 2 to node N.
pub struct TraceFormatter {
    n: usize,
    divider: String,
}

impl TraceFormatter {
    pub fn new(n: usize) -> Self {
        TraceFormatter {
            n,
            divider: "-".repeat(COLUMN_WIDTH * (n + 1)),
        }
    }

    /// Divider, column labels, divider.
    pub fn header(&self) -> String {
        let mut labels = vec!["Step".to_string(), "N'".to_string()];
        labels.extend((2..=self.n).map(|i| format!("D({i}),p({i})")));
        format!("{0}\n{1}\n{0}\n", self.divider, labels.join("\t"))
    }

    /// One table row followed by a divider.
    ///
    /// Nodes without a recorded predecessor get an empty cell.
    pub fn format(&self, step: &TraceStep) -> String {
        let visited = step
            .visited
            .iter()
            .map(|&node| (node + 1).to_string())
            .collect::<Vec<_>>()
            .join(",");

        let mut fields = vec![step.step.to_string(), visited];
        fields.extend((1..self.n).map(|i| {
            let distance = step.distance.get(i).copied().flatten();
            let predecessor = step.predecessor.get(i).copied().flatten();
            match (distance, predecessor) {
                (Some(d), Some(p)) => format!("{},{}", d, p + 1),
                _ => String::new(),
            }
        }));

        format!("{}\n{}\n", fields.join("\t"), self.divider)
    }

    pub fn write_header<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.header().as_bytes())
    }

    pub fn write_step<W: Write>(&self, out: &mut W, step: &TraceStep) -> io::Result<()> {
        out.write_all(self.format(step).as_bytes())
    }
}
