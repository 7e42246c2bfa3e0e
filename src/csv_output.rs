//! CSV output format for ROC curves
//!
//! One row per ROC point under a `threshold,fpr,tpr` header, for plotting
//! tooling and spreadsheet analysis. Persistence lives here, outside the
//! evaluation engine itself.

use crate::evaluation::RocCurve;
use std::io;
use std::path::Path;

/// Render one ROC point as a CSV row.
///
/// The leading sentinel threshold (+inf) is printed as the maximum
/// representable value, matching what plotting consumers expect.
fn format_point(threshold: f64, fpr: f64, tpr: f64) -> String {
    if threshold.is_infinite() {
        format!("{:e},{},{}", f64::MAX, fpr, tpr)
    } else {
        format!("{},{},{}", threshold, fpr, tpr)
    }
}

/// Generate the ROC CSV as a string.
pub fn roc_to_csv(curve: &RocCurve) -> String {
    let mut output = String::from("threshold,fpr,tpr\n");
    for point in &curve.points {
        output.push_str(&format_point(point.threshold, point.fpr, point.tpr));
        output.push('\n');
    }
    output
}

/// Write the ROC CSV to a file.
pub fn write_roc_csv(curve: &RocCurve, path: &Path) -> io::Result<()> {
    std::fs::write(path, roc_to_csv(curve))
}
