use crate::{OutputFormat, SimulationSummary};
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::sync::mpsc::Receiver;

fn format_summaries(summaries: &BTreeMap<usize, SimulationSummary>) -> String {
    const WIDTH: usize = 80;
    summaries
        .iter()
        .map(|(id, summary)| {
            let sim_num = format!("simulation #{}", id);
            let header = format!("{:-^WIDTH$}\n", sim_num);
            format!("{}{}{}\n", header, summary, "-".repeat(WIDTH))
        })
        .collect()
}

/// Collects the summaries sent over `receiver`, merging those sent under the same id, until every
/// id in `ids` reported it is finished. The merged summaries are then written to `writer` in id order.
pub fn write_summaries(
    receiver: Receiver<(Option<SimulationSummary>, usize)>,
    mut ids: HashSet<usize>,
    mut writer: impl Write,
    format: OutputFormat,
) -> std::io::Result<()> {
    let mut summaries: BTreeMap<usize, SimulationSummary> = BTreeMap::new();
    while !ids.is_empty() {
        // every sender is gone, nothing more will arrive
        let Ok((cur_summary, id)) = receiver.recv() else {
            break;
        };
        match cur_summary {
            Some(cur_sum) => {
                if let Some(summary) = summaries.get_mut(&id) {
                    summary.merge(&cur_sum);
                } else {
                    summaries.insert(id, cur_sum);
                }
            }
            None => {
                ids.remove(&id);
            }
        }
    }

    match format {
        OutputFormat::Text => writer.write_all(format_summaries(&summaries).as_bytes())?,
        OutputFormat::Json => {
            let ordered = summaries.values().collect::<Vec<&SimulationSummary>>();
            serde_json::to_writer_pretty(&mut writer, &ordered)?;
            writeln!(writer)?;
        }
    }
    writer.flush()
}
