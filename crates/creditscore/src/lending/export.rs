use std::io::Write;

use super::calculator::AmortizationYear;

/// Write an amortization schedule as CSV, one row per year, amounts in cents precision.
pub fn write_amortization_csv<W: Write>(
    schedule: &[AmortizationYear],
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["year", "principal_repaid", "interest", "remaining_balance"])?;

    for row in schedule {
        csv_writer.write_record([
            row.year.to_string(),
            format!("{:.2}", row.principal_repaid),
            format!("{:.2}", row.interest),
            format!("{:.2}", row.remaining_balance),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
