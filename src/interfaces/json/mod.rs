pub mod card_reader;
