/// The 120px column group on the investors table mixes two fields that only
/// share a rendered width. Pure-digit text (a trailing `+` allowed) is a deal
/// count, anything else is a round type.
///
/// Known limitation: a round type label made only of digits is read as a deal
/// count. There is no signal in the markup to tell the two apart.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DealField {
    DealsCount,
    RoundType,
}

pub fn classify(text: &str) -> DealField {
    let stripped: String = text.chars().filter(|c| *c != '+').collect();

    match !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()) {
        true => DealField::DealsCount,
        false => DealField::RoundType,
    }
}

/// Splits the mixed group into (deals, round types), keeping relative order.
pub fn split_deal_fields(texts: Vec<String>) -> (Vec<String>, Vec<String>) {
    texts
        .into_iter()
        .partition(|text| classify(text) == DealField::DealsCount)
}

#[cfg(test)]
mod tests {
    use super::{classify, split_deal_fields, DealField};

    #[test]
    fn digits_with_or_without_plus_are_deal_counts() {
        assert_eq!(classify("42"), DealField::DealsCount);
        assert_eq!(classify("12+"), DealField::DealsCount);
        assert_eq!(classify("+1+0+"), DealField::DealsCount);
    }

    #[test]
    fn labels_and_empty_text_are_round_types() {
        assert_eq!(classify("Seed"), DealField::RoundType);
        assert_eq!(classify("Series A"), DealField::RoundType);
        assert_eq!(classify(""), DealField::RoundType);
        assert_eq!(classify("+"), DealField::RoundType);
        assert_eq!(classify("1.5"), DealField::RoundType);
        assert_eq!(classify(" 7"), DealField::RoundType);
    }

    #[test]
    fn numeric_round_label_is_misread_as_deal_count() {
        assert_eq!(classify("2021"), DealField::DealsCount);
    }

    #[test]
    fn split_keeps_order_within_each_field() {
        let texts = ["120+", "Seed", "8", "Series B", "", "3"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let (deals, round_types) = split_deal_fields(texts);

        assert_eq!(deals, vec!["120+", "8", "3"]);
        assert_eq!(round_types, vec!["Seed", "Series B", ""]);
    }
}
