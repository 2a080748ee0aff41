//! Address clean-up before lookup.

/// Collapses whitespace and appends `, {country}` unless the address already
/// names it. Returns `None` for a blank address.
#[must_use]
pub fn normalize_address(address: &str, country: &str) -> Option<String> {
    let collapsed = address.split_whitespace().collect::<Vec<_>>().join(" ");
    let collapsed = collapsed.trim_matches(|c: char| c == ',' || c.is_whitespace());
    if collapsed.is_empty() {
        return None;
    }

    let country = country.trim();
    if country.is_empty() || collapsed.to_lowercase().ends_with(&country.to_lowercase()) {
        return Some(collapsed.to_owned());
    }
    Some(format!("{collapsed}, {country}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_country_suffix() {
        assert_eq!(
            normalize_address("Av. Balmaceda 2650, La Serena", "Chile").as_deref(),
            Some("Av. Balmaceda 2650, La Serena, Chile")
        );
    }

    #[test]
    fn collapses_whitespace_and_trailing_commas() {
        assert_eq!(
            normalize_address("  Av.   del Mar   100 , ", "Chile").as_deref(),
            Some("Av. del Mar 100, Chile")
        );
    }

    #[test]
    fn keeps_existing_country() {
        assert_eq!(
            normalize_address("Ruta 5 Norte, Coquimbo, chile", "Chile").as_deref(),
            Some("Ruta 5 Norte, Coquimbo, chile")
        );
    }

    #[test]
    fn blank_address_is_none() {
        assert_eq!(normalize_address("   ", "Chile"), None);
        assert_eq!(normalize_address(" , ", "Chile"), None);
    }

    #[test]
    fn empty_country_adds_nothing() {
        assert_eq!(
            normalize_address("Av. Costanera 1200", "").as_deref(),
            Some("Av. Costanera 1200")
        );
    }
}
