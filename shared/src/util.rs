/// Draw a random non-zero u64 for use as an order ID.
///
/// All 64 bits come from the thread-local RNG. IDs are not guaranteed unique;
/// the store rejects a colliding insert.
pub fn order_id() -> u64 {
    use rand::Rng;
    rand::thread_rng().gen_range(1..=u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_order_id_is_non_zero() {
        for _ in 0..1000 {
            assert_ne!(order_id(), 0);
        }
    }

    #[test]
    fn test_order_ids_do_not_collide_in_a_burst() {
        let ids: HashSet<u64> = (0..20_000).map(|_| order_id()).collect();
        assert_eq!(ids.len(), 20_000);
    }
}
