//! Offline responder: keyword intents plus catalog comparison.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use tienda_core::{
    compare_product, format_clp, search_products, sellers_by_distance, Product, Seller,
};

use crate::prompt::distance_text;
use crate::types::{ChatContext, ProductLink, Reply};

pub const GREETING_REPLY: &str = "¡Hola! 👋 ¿En qué puedo ayudarte hoy? Puedes preguntarme por \
herramientas como martillos, taladros, sierras, etc. Te diré dónde está más barato y más cerca.";

pub const HELP_REPLY: &str = "Puedo ayudarte a:\n\
• 🔍 Buscar herramientas específicas\n\
• 💰 Encontrar el precio más barato\n\
• 📍 Encontrar la ferretería más cercana\n\
• 📊 Comparar precios en todas las tiendas\n\n\
Escribe el nombre de lo que buscas, por ejemplo: \"martillo\" o \"taladro\"";

pub const NO_MATCH_REPLY: &str = "🤔 No encontré productos con ese nombre. Prueba con términos como:\n\
• Martillo\n• Taladro\n• Sierra\n• Destornillador\n• Llave\n• Cinta métrica\n\n\
O escribe \"ayuda\" para más opciones.";

static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(hola|hey|buenas|buenos|qu[eé] tal|hi)\b").expect("valid greeting regex")
});

static HELP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(ayuda|help|qu[eé] puedes|c[oó]mo funciona)").expect("valid help regex")
});

static DIRECTORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(ferreter[ií]a|tienda|d[oó]nde|cerca)").expect("valid directory regex")
});

/// Words that never name a product on their own.
const STOPWORDS: &[&str] = &[
    "busco", "buscar", "quiero", "necesito", "tienen", "venden", "hay", "precio", "precios",
    "barato", "barata", "cercano", "cercana", "cerca", "donde", "dónde", "ferretería",
    "ferreteria", "ferreterías", "ferreterias", "tienda", "tiendas", "para", "con", "una", "uno",
    "unos", "unas", "los", "las", "del", "que", "qué", "más", "mas", "algún", "alguna",
];

/// Pattern-matching responder used when the hosted model is disabled or
/// unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalResponder;

impl LocalResponder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Answers `message` against the catalog in `ctx`.
    #[must_use]
    pub fn respond(&self, message: &str, ctx: &ChatContext<'_>) -> Reply {
        let text = message.trim().to_lowercase();

        if GREETING.is_match(&text) {
            return Reply::local(GREETING_REPLY);
        }
        if HELP.is_match(&text) {
            return Reply::local(HELP_REPLY);
        }

        let best = best_match(ctx.products, &text);
        match best {
            Some(product) => compare_reply(product, ctx),
            None if DIRECTORY.is_match(&text) => directory_reply(ctx),
            None => Reply::local(NO_MATCH_REPLY),
        }
    }
}

/// The first listing matching the whole query, else the listing matching the
/// most search terms (catalog order breaks ties).
fn best_match<'a>(products: &'a [Product], text: &str) -> Option<&'a Product> {
    if let Some(first) = search_products(products, text).first().copied() {
        return Some(first);
    }

    let terms = search_terms(text);
    if terms.is_empty() {
        return None;
    }

    let mut hits: HashMap<u64, usize> = HashMap::new();
    for term in &terms {
        for product in search_products(products, term) {
            *hits.entry(product.id).or_default() += 1;
        }
    }

    let mut best: Option<(&Product, usize)> = None;
    for product in products {
        let Some(&count) = hits.get(&product.id) else {
            continue;
        };
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((product, count));
        }
    }
    best.map(|(product, _)| product)
}

fn search_terms(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() >= 3 && !STOPWORDS.contains(&w))
        .map(str::to_owned)
        .collect()
}

fn compare_reply(product: &Product, ctx: &ChatContext<'_>) -> Reply {
    let comparison = match compare_product(
        ctx.products,
        ctx.sellers,
        ctx.user.coordinate,
        product.id,
    ) {
        Ok(comparison) => comparison,
        Err(e) => {
            tracing::warn!(product_id = product.id, error = %e, "local chat comparison failed");
            return Reply::local(format!(
                "Encontré {}, pero no pude comparar sus precios en este momento.",
                product.name
            ));
        }
    };

    let group = &comparison.group;
    let store = |seller_id: &str| -> String {
        ctx.sellers
            .iter()
            .find(|s| s.id == seller_id)
            .map_or_else(|| seller_id.to_owned(), |s| s.name.clone())
    };

    let mut text = format!(
        "🔍 **{}**\nDisponible en {} ferretería(s):\n\n",
        group.product_name,
        group.offer_count()
    );
    let cheapest = &group.cheapest;
    let _ = write!(
        text,
        "💰 **Más barato:**\n{}\n{}\n\n",
        store(&cheapest.offer.seller_id),
        format_clp(cheapest.offer.price)
    );
    if group.cheapest_is_nearest() {
        text.push_str("✨ ¡El más barato también es el más cercano!\n\n");
    } else {
        let nearest = &group.nearest;
        let _ = write!(
            text,
            "📍 **Más cercano:**\n{} ({})\n{}\n\n",
            store(&nearest.offer.seller_id),
            distance_text(nearest),
            format_clp(nearest.offer.price)
        );
    }
    if ctx.user.is_fallback() {
        text.push_str("(Distancias aproximadas desde La Serena centro.)\n\n");
    }
    text.push_str("Haz clic para ver la comparativa completa:");

    Reply {
        products: vec![ProductLink {
            product_id: cheapest.offer.product_id,
            label: format!("Ver comparativa de {}", group.product_name),
            price: cheapest.offer.price,
            tag: "Mejor precio".to_owned(),
        }],
        ..Reply::local(text)
    }
}

fn directory_reply(ctx: &ChatContext<'_>) -> Reply {
    if ctx.sellers.is_empty() {
        return Reply::local("Aún no hay ferreterías registradas.");
    }

    let nearby = sellers_by_distance(ctx.sellers, ctx.user.coordinate);
    let mut text = format!("🏪 Tenemos {} ferreterías asociadas:\n\n", ctx.sellers.len());
    for entry in &nearby {
        let _ = writeln!(
            text,
            "• {}{} ({})",
            entry.seller.name,
            address_suffix(&entry.seller),
            entry.distance_label
        );
    }
    for seller in ctx.sellers.iter().filter(|s| s.coordinate.is_none()) {
        let _ = writeln!(text, "• {}{}", seller.name, address_suffix(seller));
    }
    text.push_str("\nBusca un producto para ver disponibilidad y precios en cada una.");
    Reply::local(text)
}

fn address_suffix(seller: &Seller) -> String {
    let address = seller.address.trim();
    if address.is_empty() {
        String::new()
    } else {
        format!(" - {address}")
    }
}

#[cfg(test)]
#[path = "local_test.rs"]
mod tests;
