//! Spreadsheet templates sellers fill in for bulk inventory upload.
//!
//! Each template has the same header row the upload form reads. The filled
//! ones carry sample listings; the blank one carries headers only.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};

/// Column header and width in characters.
pub(crate) const COLUMNS: [(&str, f64); 9] = [
    ("sku", 18.0),
    ("nombre", 30.0),
    ("descripcion", 50.0),
    ("marca", 15.0),
    ("precio", 10.0),
    ("tipoHerramienta", 15.0),
    ("tamaño", 15.0),
    ("cantidad", 10.0),
    ("imagen", 60.0),
];

#[derive(Debug, Clone, Copy)]
pub(crate) struct TemplateRow {
    pub sku: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub brand: &'static str,
    pub price: u32,
    pub tool_type: &'static str,
    pub size: &'static str,
    pub quantity: u32,
    pub image: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Template {
    pub file_name: &'static str,
    pub sheet_name: &'static str,
    pub rows: &'static [TemplateRow],
}

const IMG_DRILL: &str = "https://images.unsplash.com/photo-1504148455328-c376907d081c?w=400";
const IMG_GRINDER: &str = "https://images.unsplash.com/photo-1572981779307-38b8cabb2407?w=400";
const IMG_WORKSHOP: &str = "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=400";
const IMG_SITE: &str = "https://images.unsplash.com/photo-1504307651254-35680f356dfd?w=400";
const IMG_BRICK: &str = "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=400";
const IMG_PAINT: &str = "https://images.unsplash.com/photo-1562259949-e8e7689d7828?w=400";

#[allow(clippy::too_many_arguments)]
const fn row(
    sku: &'static str,
    name: &'static str,
    description: &'static str,
    brand: &'static str,
    price: u32,
    tool_type: &'static str,
    size: &'static str,
    quantity: u32,
    image: &'static str,
) -> TemplateRow {
    TemplateRow {
        sku,
        name,
        description,
        brand,
        price,
        tool_type,
        size,
        quantity,
        image,
    }
}

#[rustfmt::skip]
const TOOLS: &[TemplateRow] = &[
    row("TALADRO-002", "Taladro Percutor 750W", "Taladro percutor profesional con velocidad variable y reversa", "Bosch", 59_990, "Eléctrica", "13mm", 12, IMG_DRILL),
    row("AMOLADORA-001", "Amoladora Angular 4 1/2\"", "Amoladora 850W con disco incluido y protector", "DeWalt", 45_990, "Eléctrica", "4.5 pulgadas", 18, IMG_GRINDER),
    row("COMPRESOR-001", "Compresor de Aire 50L", "Compresor 2HP libre de aceite con tanque de 50 litros", "Evans", 189_990, "Neumática", "50 litros", 5, IMG_WORKSHOP),
    row("ROTOMARTILLO-001", "Rotomartillo SDS Plus", "Rotomartillo 800W con maletín y juego de brocas", "Makita", 129_990, "Eléctrica", "26mm", 8, IMG_DRILL),
    row("SOLDADORA-001", "Soldadora Inverter 200A", "Soldadora inverter portátil con electrodos incluidos", "Lincoln", 159_990, "Soldadura", "200 Amp", 6, IMG_SITE),
    row("ESMERIL-001", "Esmeril de Banco 6\"", "Esmeril de banco con dos piedras y protector ocular", "Truper", 39_990, "Eléctrica", "6 pulgadas", 10, IMG_GRINDER),
    row("PISTOLA-CALOR-001", "Pistola de Calor 2000W", "Pistola de calor con control de temperatura variable", "Black+Decker", 29_990, "Eléctrica", "2000W", 15, IMG_WORKSHOP),
    row("SERRUCHO-001", "Serrucho Carpintero 22\"", "Serrucho profesional con mango ergonómico antideslizante", "Stanley", 12_990, "Manual", "22 pulgadas", 25, "https://images.unsplash.com/photo-1586864387967-d02ef85d93e8?w=400"),
    row("FORMONES-001", "Set Formones 4 piezas", "Juego de formones acero al carbono con estuche", "Irwin", 24_990, "Manual", "6-12-18-25mm", 20, "https://images.unsplash.com/photo-1513467535987-fd81bc7d62f8?w=400"),
    row("CARRETILLA-001", "Carretilla de Construcción", "Carretilla 90L rueda neumática reforzada", "Tramontina", 54_990, "Construcción", "90 litros", 8, IMG_SITE),
];

#[rustfmt::skip]
const MATERIALS: &[TemplateRow] = &[
    row("CEMENTO-001", "Cemento Polpaico 25kg", "Saco de cemento gris uso general", "Polpaico", 5_990, "Construcción", "25 kg", 100, IMG_BRICK),
    row("ARENA-001", "Arena Gruesa m³", "Arena gruesa para mezclas de construcción", "Áridos Chile", 35_990, "Construcción", "1 m³", 50, IMG_WORKSHOP),
    row("GRAVILLA-001", "Gravilla 3/4\" m³", "Gravilla chancada para hormigón", "Áridos Chile", 32_990, "Construcción", "1 m³", 45, IMG_WORKSHOP),
    row("FIERRO-001", "Fierro Estriado 8mm", "Barra de fierro estriado 6 metros", "CAP", 4_990, "Construcción", "8mm x 6m", 200, IMG_SITE),
    row("LADRILLO-001", "Ladrillo Fiscal (100 un)", "Pack de 100 ladrillos fiscales", "Princesa", 45_990, "Construcción", "24x11x7 cm", 30, IMG_BRICK),
    row("YESO-001", "Yeso Carton 1.2x2.4m", "Plancha de yeso cartón estándar", "Volcanita", 8_990, "Construcción", "1.2 x 2.4m", 80, IMG_SITE),
    row("OSB-001", "OSB 9.5mm 1.22x2.44m", "Tablero OSB estructural", "Louisiana Pacific", 14_990, "Construcción", "1.22 x 2.44m", 60, IMG_WORKSHOP),
    row("PERFIL-001", "Perfil C 60x38mm 3m", "Perfil metálico galvanizado tipo C", "Cintac", 3_990, "Construcción", "60x38mm x 3m", 150, IMG_SITE),
];

#[rustfmt::skip]
const PAINT: &[TemplateRow] = &[
    row("LATEX-001", "Pintura Látex Blanco 4L", "Pintura látex mate interior/exterior lavable", "Sipa", 18_990, "Pintura", "4 litros", 40, IMG_PAINT),
    row("ESMALTE-001", "Esmalte Sintético Negro 1L", "Esmalte sintético brillante secado rápido", "Tricolor", 12_990, "Pintura", "1 litro", 35, IMG_PAINT),
    row("BARNIZ-001", "Barniz Marino 1L", "Barniz poliuretano para exterior resistente UV", "Ceresita", 15_990, "Pintura", "1 litro", 25, IMG_PAINT),
    row("RODILLO-001", "Rodillo Antigota 23cm", "Rodillo profesional con felpa de alta densidad", "Atlas", 6_990, "Pintura", "23 cm", 50, IMG_WORKSHOP),
    row("MASKING-001", "Cinta Masking 24mm x 40m", "Cinta de enmascarar para pintura", "3M", 2_990, "Pintura", "24mm x 40m", 100, IMG_WORKSHOP),
    row("ANTICORROSIVO-001", "Anticorrosivo Rojo 1L", "Base anticorrosiva para metales", "Sherwin Williams", 9_990, "Pintura", "1 litro", 30, IMG_PAINT),
    row("DILUYENTE-001", "Diluyente Sintético 1L", "Diluyente para esmaltes y barnices", "Sipa", 4_990, "Pintura", "1 litro", 45, IMG_WORKSHOP),
];

pub(crate) const TEMPLATES: [Template; 4] = [
    Template {
        file_name: "template_tools.xlsx",
        sheet_name: "Herramientas",
        rows: TOOLS,
    },
    Template {
        file_name: "template_materials.xlsx",
        sheet_name: "Materiales",
        rows: MATERIALS,
    },
    Template {
        file_name: "template_paint.xlsx",
        sheet_name: "Pinturas",
        rows: PAINT,
    },
    Template {
        file_name: "template_blank.xlsx",
        sheet_name: "Productos",
        rows: &[],
    },
];

/// Write every template into `out_dir`, creating it if needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a workbook cannot
/// be written.
pub(crate) fn write_templates(out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(TEMPLATES.len());
    for template in &TEMPLATES {
        let path = out_dir.join(template.file_name);
        write_template(template, &path)?;
        tracing::info!(path = %path.display(), rows = template.rows.len(), "template written");
        written.push(path);
    }
    Ok(written)
}

fn write_template(template: &Template, path: &Path) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(template.sheet_name)?;

    for (col, (title, width)) in (0u16..).zip(COLUMNS) {
        sheet.write_string_with_format(0, col, title, &header)?;
        sheet.set_column_width(col, width)?;
    }

    for (row, item) in (1u32..).zip(template.rows) {
        sheet.write_string(row, 0, item.sku)?;
        sheet.write_string(row, 1, item.name)?;
        sheet.write_string(row, 2, item.description)?;
        sheet.write_string(row, 3, item.brand)?;
        sheet.write_number(row, 4, f64::from(item.price))?;
        sheet.write_string(row, 5, item.tool_type)?;
        sheet.write_string(row, 6, item.size)?;
        sheet.write_number(row, 7, f64::from(item.quantity))?;
        sheet.write_string(row, 8, item.image)?;
    }

    workbook.save(path)?;
    Ok(())
}
