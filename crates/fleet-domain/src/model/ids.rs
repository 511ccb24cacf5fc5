//! Identifiers - Foreign keys issued by the owning services
//!
//! Each id is a distinct type so a carrier id can never be passed where a
//! vehicle id is expected, even though both are `i64` on the wire.

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Vehicle, owned by the vehicles service
    VehicleId
);

numeric_id!(
    /// Carrier (driver-role user) as seen by the issues service
    CarrierId
);

numeric_id!(
    /// Manager (vehicle owner) as seen by the issues service
    ManagerId
);

numeric_id!(
    /// Any user known to the identity service
    UserId
);

numeric_id!(
    /// Issue, owned by this service
    IssueId
);

numeric_id!(
    /// Shipment, owned by the shipments service
    ShipmentId
);

impl From<UserId> for CarrierId {
    /// The authenticated subject filing an issue is the carrier.
    fn from(user: UserId) -> Self {
        Self(user.get())
    }
}

impl From<UserId> for ManagerId {
    fn from(user: UserId) -> Self {
        Self(user.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_and_display() {
        let vehicle = VehicleId::new(42);
        assert_eq!(vehicle.get(), 42);
        assert_eq!(vehicle.to_string(), "42");
        assert_eq!(VehicleId::from(42), vehicle);
    }

    #[test]
    fn test_user_converts_to_carrier_and_manager() {
        let user = UserId::new(7);
        assert_eq!(CarrierId::from(user), CarrierId::new(7));
        assert_eq!(ManagerId::from(user), ManagerId::new(7));
    }
}
