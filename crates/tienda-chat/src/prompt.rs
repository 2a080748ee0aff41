//! System prompt assembly for the hosted model.

use std::collections::HashMap;
use std::fmt::Write as _;

use tienda_core::{format_clp, format_distance, OfferGroup, RankedOffer, Seller, UserLocation};

const INSTRUCTIONS: &str = "\
INSTRUCCIONES:
- Responde en español chileno, amigable y breve
- Si preguntan por un producto, menciona opciones disponibles con precios
- Sugiere el más barato o el más cercano según lo que pidan
- Mantén respuestas cortas (máximo 2-3 oraciones)";

/// Builds the system prompt from ranked offer groups.
///
/// Each group contributes one line with its cheapest and nearest offer. An
/// empty slice yields the "no products" placeholder instead of an empty list.
#[must_use]
pub fn build_system_prompt(groups: &[OfferGroup], user: UserLocation, sellers: &[Seller]) -> String {
    let names: HashMap<&str, &str> = sellers
        .iter()
        .map(|s| (s.id.as_str(), s.name.as_str()))
        .collect();
    let store_name = |offer: &RankedOffer| -> String {
        names
            .get(offer.offer.seller_id.as_str())
            .map_or_else(|| offer.offer.seller_id.clone(), |n| (*n).to_owned())
    };

    let mut prompt = String::from(
        "Eres un asistente de MiTienda, un marketplace de ferreterías en La Serena, Chile.\n\
         Tu objetivo es ayudar a los clientes a encontrar productos de ferretería.\n\n",
    );

    if user.is_precise() {
        prompt.push_str("UBICACIÓN DEL CLIENTE: precisa (GPS del dispositivo).\n\n");
    } else {
        prompt.push_str(
            "UBICACIÓN DEL CLIENTE: aproximada (punto de referencia en La Serena); \
             aclara que las distancias son estimadas.\n\n",
        );
    }

    prompt.push_str("PRODUCTOS DISPONIBLES:\n");
    if groups.is_empty() {
        prompt.push_str("No hay productos disponibles\n");
    }
    for group in groups {
        let cheapest = &group.cheapest;
        let _ = write!(
            prompt,
            "- {}: más barato {} en {}",
            group.product_name,
            format_clp(cheapest.offer.price),
            store_name(cheapest),
        );
        if group.is_exclusive {
            prompt.push_str(" (solo en esta tienda)");
        } else if group.cheapest_is_nearest() {
            let _ = write!(
                prompt,
                " a {}, también el más cercano",
                distance_text(cheapest)
            );
        } else {
            let nearest = &group.nearest;
            let _ = write!(
                prompt,
                "; más cercano {} en {} a {}",
                format_clp(nearest.offer.price),
                store_name(nearest),
                distance_text(nearest),
            );
        }
        prompt.push('\n');
    }

    prompt.push('\n');
    prompt.push_str(INSTRUCTIONS);
    prompt
}

pub(crate) fn distance_text(offer: &RankedOffer) -> String {
    if offer.distance_known {
        format_distance(offer.distance_meters)
    } else {
        "distancia desconocida".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tienda_core::{rank_all_groups, Coordinate, Offer, SellerLocation};

    use super::*;

    const USER: Coordinate = Coordinate {
        lat: -29.9045,
        lng: -71.2489,
    };

    fn seller(id: &str, name: &str, lat: f64, lng: f64) -> Seller {
        Seller {
            id: id.to_owned(),
            name: name.to_owned(),
            email: format!("{id}@example.cl"),
            business_type: String::new(),
            address: String::new(),
            phone: String::new(),
            coordinate: Some(Coordinate { lat, lng }),
        }
    }

    fn offer(key: &str, id: u64, seller_id: &str, price: i64) -> Offer {
        Offer {
            product_key: key.to_owned(),
            product_id: id,
            product_name: key.to_owned(),
            seller_id: seller_id.to_owned(),
            price: Decimal::from(price),
            quantity_available: 3,
            seller_coordinate: None,
        }
    }

    fn groups(sellers: &[Seller], offers: &[Offer]) -> Vec<OfferGroup> {
        let locations: Vec<SellerLocation> = sellers.iter().map(Seller::location).collect();
        rank_all_groups(offers, &locations, USER, None).unwrap()
    }

    #[test]
    fn lists_cheapest_and_nearest_with_store_names() {
        let sellers = vec![
            seller("near", "Ferretería Cerca", -29.9050, -71.2490),
            seller("far", "Ferretería Lejos", -29.9600, -71.3300),
        ];
        let offers = vec![offer("Martillo", 1, "near", 9990), offer("Martillo", 2, "far", 8490)];
        let prompt = build_system_prompt(&groups(&sellers, &offers), UserLocation::precise(USER), &sellers);

        assert!(prompt.contains("más barato $8.490 en Ferretería Lejos"));
        assert!(prompt.contains("más cercano $9.990 en Ferretería Cerca"));
        assert!(prompt.contains("precisa"));
        assert!(prompt.ends_with("(máximo 2-3 oraciones)"));
    }

    #[test]
    fn notes_exclusive_and_fallback_location() {
        let sellers = vec![seller("solo", "Única", -29.95, -71.30)];
        let offers = vec![offer("Sierra", 1, "solo", 12_990)];
        let prompt =
            build_system_prompt(&groups(&sellers, &offers), UserLocation::fallback(USER), &sellers);

        assert!(prompt.contains("Sierra: más barato $12.990 en Única (solo en esta tienda)"));
        assert!(prompt.contains("aproximada"));
    }

    #[test]
    fn unknown_seller_falls_back_to_id_and_unknown_distance() {
        let sellers = vec![seller("a", "Tienda A", -29.9050, -71.2490)];
        let offers = vec![offer("Taladro", 1, "a", 50_000), offer("Taladro", 2, "ghost", 40_000)];
        let prompt = build_system_prompt(&groups(&sellers, &offers), UserLocation::precise(USER), &sellers);

        assert!(prompt.contains("más barato $40.000 en ghost"));
        assert!(prompt.contains("más cercano $50.000 en Tienda A"));
    }

    #[test]
    fn empty_catalog_has_placeholder() {
        let prompt = build_system_prompt(&[], UserLocation::fallback(USER), &[]);
        assert!(prompt.contains("No hay productos disponibles"));
    }
}
