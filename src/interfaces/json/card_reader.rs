use crate::domain::card::CardRequest;
use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads a card issuance request from JSON.
///
/// Field names follow the card form (`cardholderName`, `cardNumber`, ...).
/// Missing fields are left empty and caught later by validation.
pub fn read_card_request<R: Read>(source: R) -> Result<CardRequest> {
    Ok(serde_json::from_reader(source)?)
}

pub fn load_card_request(path: impl AsRef<Path>) -> Result<CardRequest> {
    let file = File::open(path)?;
    read_card_request(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::CardNetwork;
    use crate::error::{AtmError, CardRule};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"cardholderName":"Jane Roe","cardNumber":"5500000000000004","expiryDate":"01/28","cvv":"999","cardType":"mastercard"}}"#
        )
        .unwrap();

        let request = load_card_request(file.path()).unwrap();
        assert_eq!(request.cardholder_name, "Jane Roe");
        assert_eq!(request.card_type, CardNetwork::Mastercard);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_partial_request_fails_validation_not_parsing() {
        let request = read_card_request(r#"{"cardholderName":"Jane Roe"}"#.as_bytes()).unwrap();
        let err = request.validate().unwrap_err();
        assert!(err.violates(CardRule::NumberNotSixteenDigits));
        assert!(!err.violates(CardRule::OwnerNameTooShort));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            read_card_request("{not json".as_bytes()),
            Err(AtmError::JsonError(_))
        ));
    }
}
