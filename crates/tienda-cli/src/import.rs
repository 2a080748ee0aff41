//! Bulk inventory upload from a filled-in spreadsheet template.
//!
//! Only the first sheet is read. Row 1 holds the headers, matched
//! case-insensitively, so `precio` and `Precio` both work; unknown columns are
//! ignored. Blank rows are skipped and blank cells take the same defaults the
//! upload form applies.

use std::path::Path;

use anyhow::{bail, Context};
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tienda_store::{CatalogStore, ProductDraft};

pub(crate) const DEFAULT_NAME: &str = "Sin nombre";
pub(crate) const DEFAULT_TOOL_TYPE: &str = "Manual";
pub(crate) const DEFAULT_SIZE: &str = "Estándar";

/// Column index of each recognised header.
#[derive(Debug, Default)]
struct Columns {
    sku: Option<usize>,
    name: Option<usize>,
    description: Option<usize>,
    brand: Option<usize>,
    price: Option<usize>,
    quantity: Option<usize>,
    tool_type: Option<usize>,
    size: Option<usize>,
    image: Option<usize>,
}

impl Columns {
    fn from_header(header: &[Data]) -> anyhow::Result<Self> {
        let mut columns = Self::default();
        for (index, cell) in header.iter().enumerate() {
            let Some(title) = text(cell) else { continue };
            let slot = match title.to_lowercase().as_str() {
                "sku" => &mut columns.sku,
                "nombre" => &mut columns.name,
                "descripcion" | "descripción" => &mut columns.description,
                "marca" => &mut columns.brand,
                "precio" => &mut columns.price,
                "cantidad" => &mut columns.quantity,
                "tipoherramienta" => &mut columns.tool_type,
                "tamaño" => &mut columns.size,
                "imagen" => &mut columns.image,
                _ => continue,
            };
            slot.get_or_insert(index);
        }
        if columns.name.is_none() && columns.sku.is_none() {
            bail!("header row has neither a 'nombre' nor a 'sku' column");
        }
        Ok(columns)
    }
}

/// Read the first sheet of the workbook at `path` into listing drafts.
///
/// # Errors
///
/// Returns an error if the file is not a readable .xlsx workbook, has no
/// sheets, lacks a usable header row, or holds a non-numeric price or
/// quantity.
pub(crate) fn read_drafts(path: &Path) -> anyhow::Result<Vec<ProductDraft>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("failed to open workbook {}", path.display()))?;
    let Some(sheet) = workbook.sheet_names().into_iter().next() else {
        bail!("{} has no sheets", path.display());
    };
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("failed to read sheet '{sheet}'"))?;

    drafts_from_rows(range.rows()).with_context(|| format!("sheet '{sheet}'"))
}

/// Turn a header row plus data rows into drafts. An empty sheet yields none.
pub(crate) fn drafts_from_rows<'a>(
    rows: impl IntoIterator<Item = &'a [Data]>,
) -> anyhow::Result<Vec<ProductDraft>> {
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let columns = Columns::from_header(header)?;

    let mut drafts = Vec::new();
    // Row 1 is the header; spreadsheet rows are 1-based.
    for (line, row) in (2usize..).zip(rows) {
        if row.iter().all(|cell| text(cell).is_none()) {
            continue;
        }
        let draft = draft_from_row(&columns, row).with_context(|| format!("row {line}"))?;
        drafts.push(draft);
    }
    Ok(drafts)
}

fn draft_from_row(columns: &Columns, row: &[Data]) -> anyhow::Result<ProductDraft> {
    let cell = |index: Option<usize>| index.and_then(|i| row.get(i));
    let field = |index: Option<usize>| cell(index).and_then(text);

    let price = number(cell(columns.price)).context("precio")?.unwrap_or_default();
    let quantity = match number(cell(columns.quantity)).context("cantidad")? {
        Some(q) => q
            .trunc()
            .to_u32()
            .with_context(|| format!("cantidad {q} is not a valid stock count"))?,
        None => 0,
    };

    Ok(ProductDraft {
        id: None,
        sku: field(columns.sku),
        name: field(columns.name).unwrap_or_else(|| DEFAULT_NAME.to_owned()),
        description: field(columns.description).unwrap_or_default(),
        brand: field(columns.brand).unwrap_or_default(),
        tool_type: field(columns.tool_type).unwrap_or_else(|| DEFAULT_TOOL_TYPE.to_owned()),
        size: field(columns.size).unwrap_or_else(|| DEFAULT_SIZE.to_owned()),
        quantity,
        price,
        image_url: field(columns.image),
    })
}

/// Trimmed cell text; `None` for blank or error cells.
fn text(cell: &Data) -> Option<String> {
    let value = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_owned(),
        other => other.to_string().trim().to_owned(),
    };
    (!value.is_empty()).then_some(value)
}

fn number(cell: Option<&Data>) -> anyhow::Result<Option<Decimal>> {
    match cell {
        None | Some(Data::Empty) => Ok(None),
        Some(Data::Int(i)) => Ok(Some(Decimal::from(*i))),
        Some(Data::Float(f)) => Ok(Some(Decimal::try_from(*f)?)),
        Some(Data::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Data::String(s)) => Ok(Some(
            s.trim()
                .parse()
                .with_context(|| format!("'{}' is not a number", s.trim()))?,
        )),
        Some(other) => bail!("'{other}' is not a number"),
    }
}

/// Load a workbook into `seller_id`'s inventory.
///
/// Rows are added next to the seller's current listings unless `replace` is
/// set, in which case they become the seller's whole inventory. Either way
/// the write is a single store update, so a bad row leaves the inventory
/// untouched.
///
/// # Errors
///
/// Returns an error if the workbook cannot be read, the seller does not
/// exist, or a row fails listing validation.
pub(crate) fn run_import(
    store: &CatalogStore,
    seller_id: &str,
    file: &Path,
    replace: bool,
) -> anyhow::Result<usize> {
    let drafts = read_drafts(file)?;
    let imported = drafts.len();

    let inventory = if replace {
        drafts
    } else {
        let mut current: Vec<ProductDraft> = store
            .seller_products(seller_id)?
            .iter()
            .map(ProductDraft::from)
            .collect();
        current.extend(drafts);
        current
    };
    let listings = store.replace_seller_inventory(seller_id, inventory)?;

    tracing::info!(
        seller_id,
        file = %file.display(),
        imported,
        listings = listings.len(),
        replace,
        "inventory imported"
    );
    Ok(imported)
}
