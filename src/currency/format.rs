const DECIMAL_SEPARATOR: char = '.';
const GROUPING_SEPARATOR: char = ',';

/// Two decimals with thousands grouping, e.g. `-1,234.50`.
pub fn format_amount(value: f64) -> String {
    format_number(value, 2)
}

pub fn format_number(value: f64, precision: u8) -> String {
    let body = format!("{:.*}", precision as usize, value);
    match body.find(DECIMAL_SEPARATOR) {
        Some(pos) => format!("{}{}", insert_grouping(&body[..pos]), &body[pos..]),
        None => insert_grouping(&body),
    }
}

fn insert_grouping(int_part: &str) -> String {
    match int_part.strip_prefix('-') {
        Some(digits) => format!("-{}", group_digits(digits)),
        None => group_digits(int_part),
    }
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, GROUPING_SEPARATOR);
        }
        grouped.insert(0, ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(999.0), "999.00");
    }

    #[test]
    fn keeps_sign_outside_groups() {
        assert_eq!(format_amount(-1234.5), "-1,234.50");
        assert_eq!(format_amount(-12.0), "-12.00");
    }

    #[test]
    fn honours_precision() {
        assert_eq!(format_number(1500.0, 0), "1,500");
    }
}
