use kernel::id::Id;

pub struct UserMarker;

/// Store-assigned user identifier (`users.id`)
pub type UserId = Id<UserMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_from_raw() {
        let user_id = UserId::from_raw(1);
        assert_eq!(user_id.as_i64(), 1);
        assert_eq!(i64::from(user_id), 1);
    }
}
