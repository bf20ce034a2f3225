use strum_macros::{Display, FromRepr};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, FromRepr)]
#[repr(u8)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    System = 4,
    ApiUser = 5,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        Self::from_repr(id)
    }

    /// Roles allowed to read other employees' timekeeping.
    pub fn is_manager(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}
