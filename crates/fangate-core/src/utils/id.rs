// ID generation for marketplace records.

/// Generate a unique record ID using nanoid (21 characters).
pub fn generate_id() -> String {
    nanoid::nanoid!()
}

/// Generate an ID with a custom length.
pub fn generate_id_with_length(len: usize) -> String {
    nanoid::nanoid!(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_length() {
        assert_eq!(generate_id().len(), 21);
        assert_eq!(generate_id_with_length(8).len(), 8);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
