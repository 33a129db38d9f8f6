use crate::metrics::{AggregateMetric, ApplicationKey};
use std::io::{self, Write};

/// Writes one `<name>,<version>,<rate>` line per entry, rate with two
/// decimals. Returns the number of lines written.
pub fn write_report<W: Write>(
    entries: &[(ApplicationKey, AggregateMetric)],
    sink: &mut W,
) -> io::Result<usize> {
    for (app, metric) in entries {
        writeln!(sink, "{}", report_line(app, metric))?;
    }
    sink.flush()?;
    Ok(entries.len())
}

pub fn report_line(app: &ApplicationKey, metric: &AggregateMetric) -> String {
    format!("{},{},{:.2}", app.name, app.version, metric.success_rate())
}
