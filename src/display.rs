//! Display formatting

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};

use crate::{
    pricing::{MINOR_UNITS_PER_MAJOR, Price},
    snapshot::CartSnapshot,
};

/// Formats a price for display, e.g. `$29.97` or `12.00 CAD` for currencies without a
/// known symbol.
pub fn format_price(price: &Price) -> String {
    let minor_units = price.to_minor_units();
    let currency_code = price.currency().iso_alpha_code;

    let abs_minor = minor_units.unsigned_abs();
    let major_units = abs_minor / MINOR_UNITS_PER_MAJOR.unsigned_abs();
    let fractional = abs_minor % MINOR_UNITS_PER_MAJOR.unsigned_abs();
    let sign = if minor_units < 0 { "-" } else { "" };

    let symbol = match currency_code {
        "GBP" => "£",
        "USD" => "$",
        "EUR" => "€",
        _ => "",
    };

    if symbol.is_empty() {
        format!("{sign}{major_units}.{fractional:02} {currency_code}")
    } else {
        format!("{sign}{symbol}{major_units}.{fractional:02}")
    }
}

/// Writes the cart as a table of lines followed by the item count and grand total.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_cart_table(out: &mut impl io::Write, snapshot: &CartSnapshot) -> io::Result<()> {
    let mut builder = Builder::default();

    builder.push_record(["Line", "Product", "Unit price", "Qty", "Total"]);

    for line in snapshot.iter() {
        builder.push_record([
            line.id().to_string(),
            line.name().to_string(),
            format_price(line.unit_price()),
            line.quantity().to_string(),
            format_price(line.total()),
        ]);
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    writeln!(out, "\n{table}")?;
    writeln!(out, "Items: {}", snapshot.items_count())?;
    writeln!(out, "Total: {}", format_price(snapshot.grand_total()))
}
