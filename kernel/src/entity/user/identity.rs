use crate::entity::UserId;

/// Who is asking, as established by the upstream authentication layer.
///
/// Passed explicitly into every reservation operation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Identity {
    user_id: UserId,
    is_admin: bool,
    is_staff: bool,
}

impl Identity {
    pub fn new(user_id: UserId, is_admin: bool, is_staff: bool) -> Self {
        Self {
            user_id,
            is_admin,
            is_staff,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    /// Admin or staff.
    pub fn is_privileged(&self) -> bool {
        self.is_admin || self.is_staff
    }
}
