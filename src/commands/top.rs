//! Top command implementation.
//!
//! Runs the external listing once and prints it.

use procwatch::{ExternalListing, ExternalListingAdapter};

use crate::config::Config;

/// Formats a listing as aligned columns.
pub fn render_listing_table(listing: &ExternalListing) -> String {
    let mut widths: Vec<usize> = listing.header.iter().map(|h| h.len()).collect();
    let columns = widths.len();
    for row in listing.rows.iter().filter(|r| r.len() == columns) {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string()
    };

    let mut out = format_row(&listing.header);
    out.push('\n');
    for row in &listing.rows {
        if row.len() == columns {
            out.push_str(&format_row(row));
        } else {
            out.push_str(&row.join(" "));
        }
        out.push('\n');
    }
    out
}

/// Prints one external listing.
pub async fn command_top(json: bool, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let adapter = ExternalListingAdapter::new(config.listing_options());
    let listing = adapter.list_detailed().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        print!("{}", render_listing_table(&listing));
    }

    if listing.is_placeholder() {
        return Err(listing.rows[0][0].clone().into());
    }
    Ok(())
}
