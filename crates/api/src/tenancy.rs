//! Centralized tenancy and role authorization.
//!
//! Every mutating or scoped-read route funnels through [`authorize`] instead
//! of carrying its own role checks, so there is exactly one place where the
//! multi-tenancy boundary is decided. The function is pure: callers resolve
//! the actor's vendor (for sellers) and the resource's ownership up front,
//! then ask for a decision.
//!
//! The actor is always the *effective* identity. When an admin impersonates
//! a seller, it is the seller's role and vendor that are consulted here;
//! the admin's own privileges are out of reach until impersonation ends.

use serde::Serialize;

use bazaar_core::{Role, UserId, VendorId};

use crate::db::vendors::VendorRepository;
use crate::models::User;

/// The identity a request acts as, with the seller's vendor pre-resolved.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    /// Effective user ID.
    pub user_id: UserId,
    /// Effective role.
    pub role: Role,
    /// The vendor owned by this actor, when the actor is a seller with a
    /// storefront. `None` for every other role, and for sellers that have
    /// not claimed a vendor yet. Such sellers are denied everything
    /// vendor-scoped, with no partial fallback.
    pub vendor_id: Option<VendorId>,
}

impl Actor {
    /// Build an actor for `user`, resolving the owned vendor for sellers.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the vendor lookup fails.
    pub async fn for_user(
        user: &User,
        vendors: &VendorRepository<'_>,
    ) -> Result<Self, crate::db::RepositoryError> {
        let vendor_id = if user.role == Role::Seller {
            vendors.get_by_owner(user.id).await?.map(|v| v.id)
        } else {
            None
        };

        Ok(Self {
            user_id: user.id,
            role: user.role,
            vendor_id,
        })
    }
}

/// An action against a claimed resource, with ownership facts resolved.
#[derive(Debug, Clone, Copy)]
pub enum Action {
    /// Change another account's role. Reserved to super admins.
    ChangeUserRole {
        /// The account being changed.
        target: UserId,
    },
    /// Delete an account. Reserved to super admins; self-deletion and
    /// non-deletable accounts are refused regardless of role.
    DeleteUser {
        /// The account being deleted.
        target: UserId,
        /// The target's `deletable` flag.
        target_deletable: bool,
    },
    /// Write to a vendor-scoped resource: a product, a non-global category,
    /// a vendor profile, or an order's status.
    WriteVendorScoped {
        /// The vendor the resource belongs to.
        vendor_id: VendorId,
    },
    /// Create or mutate a global category.
    WriteGlobalCategory,
    /// Move an order through its status lifecycle. Unlike other
    /// vendor-scoped writes, support admins may do this unconditionally.
    UpdateOrderStatus {
        /// The vendor the order belongs to.
        vendor_id: VendorId,
    },
    /// Read one order. Open to admins (the read counterpart of their
    /// status grant), the owning vendor's seller, and the owning
    /// customer in any role.
    ReadOrder {
        /// The customer the order belongs to.
        customer_id: UserId,
        /// The vendor the order belongs to.
        vendor_id: VendorId,
    },
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The action is reserved to super admins.
    RequiresSuperAdmin,
    /// Accounts cannot delete themselves.
    SelfDeletion,
    /// The target account is flagged non-deletable.
    NotDeletable,
    /// The actor does not own the resource's vendor.
    NotVendorOwner,
    /// The actor does not own the resource.
    NotResourceOwner,
    /// The actor's role cannot perform this action at all.
    RoleForbidden,
}

impl DenyReason {
    /// Short, user-facing explanation.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::RequiresSuperAdmin => "this action requires super admin privileges",
            Self::SelfDeletion => "accounts cannot delete themselves",
            Self::NotDeletable => "this account cannot be deleted",
            Self::NotVendorOwner => "you do not own this vendor",
            Self::NotResourceOwner => "you do not own this resource",
            Self::RoleForbidden => "your role cannot perform this action",
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The actor may proceed.
    Allow,
    /// The actor may not proceed.
    Deny(DenyReason),
}

impl Decision {
    /// Whether the decision is [`Decision::Allow`].
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Which categories an actor may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryScope {
    /// Every category, global and vendor-scoped.
    All,
    /// Global categories plus the actor's own vendor's.
    GlobalAndVendor(VendorId),
    /// No categories. Buyers and anonymous visitors browse storefronts, not
    /// the category administration view; an empty scope is the designed
    /// answer, not an error.
    Empty,
}

/// Decide whether `actor` may perform `action`.
///
/// Rules in precedence order:
/// 1. Super admins are allowed everything except where an explicit guard
///    below says otherwise.
/// 2. Role changes and deletions require super admin; deletion additionally
///    forbids self-deletion and non-deletable targets for everyone.
/// 3. Vendor-scoped writes require a seller who owns the resource's vendor.
/// 4. Global category writes require super admin.
/// 5. Order reads are open to admins, the owning vendor's seller, and the
///    owning customer.
/// 6. Everything else is denied.
#[must_use]
pub fn authorize(actor: &Actor, action: &Action) -> Decision {
    match *action {
        Action::ChangeUserRole { .. } => {
            if actor.role == Role::SuperAdmin {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::RequiresSuperAdmin)
            }
        }
        Action::DeleteUser {
            target,
            target_deletable,
        } => {
            if actor.role != Role::SuperAdmin {
                return Decision::Deny(DenyReason::RequiresSuperAdmin);
            }
            if target == actor.user_id {
                return Decision::Deny(DenyReason::SelfDeletion);
            }
            if !target_deletable {
                return Decision::Deny(DenyReason::NotDeletable);
            }
            Decision::Allow
        }
        Action::WriteVendorScoped { vendor_id } => match actor.role {
            Role::SuperAdmin => Decision::Allow,
            Role::Seller => {
                if actor.vendor_id == Some(vendor_id) {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::NotVendorOwner)
                }
            }
            Role::Admin | Role::Buyer => Decision::Deny(DenyReason::RoleForbidden),
        },
        Action::UpdateOrderStatus { vendor_id } => match actor.role {
            Role::Admin | Role::SuperAdmin => Decision::Allow,
            Role::Seller => {
                if actor.vendor_id == Some(vendor_id) {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::NotVendorOwner)
                }
            }
            Role::Buyer => Decision::Deny(DenyReason::RoleForbidden),
        },
        Action::WriteGlobalCategory => {
            if actor.role == Role::SuperAdmin {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::RequiresSuperAdmin)
            }
        }
        Action::ReadOrder {
            customer_id,
            vendor_id,
        } => match actor.role {
            Role::Admin | Role::SuperAdmin => Decision::Allow,
            Role::Seller if actor.vendor_id == Some(vendor_id) => Decision::Allow,
            // Sellers buying from another vendor still see their own orders.
            _ if customer_id == actor.user_id => Decision::Allow,
            _ => Decision::Deny(DenyReason::NotResourceOwner),
        },
    }
}

/// Category visibility for an actor (or an anonymous visitor).
#[must_use]
pub fn category_scope(actor: Option<&Actor>) -> CategoryScope {
    match actor {
        Some(actor) if actor.role == Role::SuperAdmin => CategoryScope::All,
        Some(actor) if actor.role == Role::Seller => actor
            .vendor_id
            .map_or(CategoryScope::Empty, CategoryScope::GlobalAndVendor),
        _ => CategoryScope::Empty,
    }
}

/// Which orders an actor may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Every order.
    All,
    /// Orders placed against the actor's vendor.
    Vendor(VendorId),
    /// Orders the actor placed as a customer.
    Customer(UserId),
    /// No orders; a seller without a vendor has nothing to list.
    Empty,
}

/// Order list visibility for an actor. Admins get the full listing, the
/// read counterpart of their unconditional status grant.
#[must_use]
pub fn order_scope(actor: &Actor) -> OrderScope {
    match actor.role {
        Role::Admin | Role::SuperAdmin => OrderScope::All,
        Role::Seller => actor.vendor_id.map_or(OrderScope::Empty, OrderScope::Vendor),
        Role::Buyer => OrderScope::Customer(actor.user_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: i32, role: Role, vendor: Option<i32>) -> Actor {
        Actor {
            user_id: UserId::new(id),
            role,
            vendor_id: vendor.map(VendorId::new),
        }
    }

    const VENDOR_A: VendorId = VendorId::new(10);
    const VENDOR_B: VendorId = VendorId::new(20);

    #[test]
    fn test_seller_allowed_on_own_vendor() {
        let seller = actor(1, Role::Seller, Some(10));
        let decision = authorize(
            &seller,
            &Action::WriteVendorScoped {
                vendor_id: VENDOR_A,
            },
        );
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn test_seller_denied_on_foreign_vendor() {
        let seller = actor(1, Role::Seller, Some(10));
        let decision = authorize(
            &seller,
            &Action::WriteVendorScoped {
                vendor_id: VENDOR_B,
            },
        );
        assert_eq!(decision, Decision::Deny(DenyReason::NotVendorOwner));
    }

    #[test]
    fn test_seller_without_vendor_denied_everything_scoped() {
        let seller = actor(1, Role::Seller, None);
        for vendor_id in [VENDOR_A, VENDOR_B] {
            let decision = authorize(&seller, &Action::WriteVendorScoped { vendor_id });
            assert_eq!(decision, Decision::Deny(DenyReason::NotVendorOwner));
        }
    }

    #[test]
    fn test_admin_is_not_a_vendor_writer() {
        // Plain admins support users; they do not edit catalogs.
        let admin = actor(1, Role::Admin, None);
        let decision = authorize(
            &admin,
            &Action::WriteVendorScoped {
                vendor_id: VENDOR_A,
            },
        );
        assert_eq!(decision, Decision::Deny(DenyReason::RoleForbidden));
    }

    #[test]
    fn test_super_admin_allowed_everywhere_vendor_scoped() {
        let root = actor(1, Role::SuperAdmin, None);
        for vendor_id in [VENDOR_A, VENDOR_B] {
            assert!(authorize(&root, &Action::WriteVendorScoped { vendor_id }).is_allowed());
        }
    }

    #[test]
    fn test_role_change_requires_super_admin() {
        let target = UserId::new(9);
        for role in [Role::Buyer, Role::Seller, Role::Admin] {
            let decision = authorize(&actor(1, role, None), &Action::ChangeUserRole { target });
            assert_eq!(decision, Decision::Deny(DenyReason::RequiresSuperAdmin));
        }
        assert!(
            authorize(
                &actor(1, Role::SuperAdmin, None),
                &Action::ChangeUserRole { target }
            )
            .is_allowed()
        );
    }

    #[test]
    fn test_self_deletion_forbidden() {
        let root = actor(1, Role::SuperAdmin, None);
        let decision = authorize(
            &root,
            &Action::DeleteUser {
                target: UserId::new(1),
                target_deletable: true,
            },
        );
        assert_eq!(decision, Decision::Deny(DenyReason::SelfDeletion));
    }

    #[test]
    fn test_non_deletable_target_protected_from_every_role() {
        for role in [Role::Buyer, Role::Seller, Role::Admin, Role::SuperAdmin] {
            let decision = authorize(
                &actor(1, role, None),
                &Action::DeleteUser {
                    target: UserId::new(9),
                    target_deletable: false,
                },
            );
            assert!(!decision.is_allowed(), "role {role} must not delete");
        }
    }

    #[test]
    fn test_order_status_open_to_admins_and_owning_seller() {
        for role in [Role::Admin, Role::SuperAdmin] {
            assert!(
                authorize(
                    &actor(1, role, None),
                    &Action::UpdateOrderStatus {
                        vendor_id: VENDOR_A
                    }
                )
                .is_allowed()
            );
        }
        assert!(
            authorize(
                &actor(1, Role::Seller, Some(10)),
                &Action::UpdateOrderStatus {
                    vendor_id: VENDOR_A
                }
            )
            .is_allowed()
        );
        let foreign = authorize(
            &actor(1, Role::Seller, Some(10)),
            &Action::UpdateOrderStatus {
                vendor_id: VENDOR_B,
            },
        );
        assert_eq!(foreign, Decision::Deny(DenyReason::NotVendorOwner));
        let buyer = authorize(
            &actor(1, Role::Buyer, None),
            &Action::UpdateOrderStatus {
                vendor_id: VENDOR_A,
            },
        );
        assert_eq!(buyer, Decision::Deny(DenyReason::RoleForbidden));
    }

    #[test]
    fn test_global_category_writes_super_admin_only() {
        for role in [Role::Buyer, Role::Seller, Role::Admin] {
            let decision = authorize(&actor(1, role, Some(10)), &Action::WriteGlobalCategory);
            assert_eq!(decision, Decision::Deny(DenyReason::RequiresSuperAdmin));
        }
        assert!(
            authorize(&actor(1, Role::SuperAdmin, None), &Action::WriteGlobalCategory)
                .is_allowed()
        );
    }

    #[test]
    fn test_order_read_open_to_admins_owner_and_owning_seller() {
        let order = Action::ReadOrder {
            customer_id: UserId::new(5),
            vendor_id: VENDOR_A,
        };
        for role in [Role::Admin, Role::SuperAdmin] {
            assert!(authorize(&actor(1, role, None), &order).is_allowed());
        }
        assert!(authorize(&actor(1, Role::Seller, Some(10)), &order).is_allowed());
        assert!(authorize(&actor(5, Role::Buyer, None), &order).is_allowed());
    }

    #[test]
    fn test_order_read_denied_to_strangers() {
        let order = Action::ReadOrder {
            customer_id: UserId::new(5),
            vendor_id: VENDOR_A,
        };
        let other_buyer = authorize(&actor(6, Role::Buyer, None), &order);
        assert_eq!(other_buyer, Decision::Deny(DenyReason::NotResourceOwner));
        let foreign_seller = authorize(&actor(1, Role::Seller, Some(20)), &order);
        assert_eq!(foreign_seller, Decision::Deny(DenyReason::NotResourceOwner));
    }

    #[test]
    fn test_seller_sees_own_purchases_from_foreign_vendor() {
        // A seller buying from vendor B reads that order as its customer.
        let decision = authorize(
            &actor(5, Role::Seller, Some(10)),
            &Action::ReadOrder {
                customer_id: UserId::new(5),
                vendor_id: VENDOR_B,
            },
        );
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn test_order_scope_by_role() {
        for role in [Role::Admin, Role::SuperAdmin] {
            assert_eq!(order_scope(&actor(1, role, None)), OrderScope::All);
        }
        assert_eq!(
            order_scope(&actor(1, Role::Seller, Some(10))),
            OrderScope::Vendor(VENDOR_A)
        );
        assert_eq!(order_scope(&actor(1, Role::Seller, None)), OrderScope::Empty);
        assert_eq!(
            order_scope(&actor(5, Role::Buyer, None)),
            OrderScope::Customer(UserId::new(5))
        );
    }

    #[test]
    fn test_category_scope_by_role() {
        assert_eq!(
            category_scope(Some(&actor(1, Role::SuperAdmin, None))),
            CategoryScope::All
        );
        assert_eq!(
            category_scope(Some(&actor(1, Role::Seller, Some(10)))),
            CategoryScope::GlobalAndVendor(VENDOR_A)
        );
        assert_eq!(
            category_scope(Some(&actor(1, Role::Seller, None))),
            CategoryScope::Empty
        );
        assert_eq!(
            category_scope(Some(&actor(1, Role::Buyer, None))),
            CategoryScope::Empty
        );
        assert_eq!(category_scope(None), CategoryScope::Empty);
    }

    #[test]
    fn test_impersonated_seller_scope_not_admin_scope() {
        // A super_admin impersonating a seller is represented by an Actor
        // built from the seller account; the resolver sees only the seller.
        let effective = actor(2, Role::Seller, Some(10));
        assert!(
            authorize(
                &effective,
                &Action::WriteVendorScoped {
                    vendor_id: VENDOR_A
                }
            )
            .is_allowed()
        );
        let decision = authorize(
            &effective,
            &Action::ChangeUserRole {
                target: UserId::new(9),
            },
        );
        assert_eq!(decision, Decision::Deny(DenyReason::RequiresSuperAdmin));
    }
}
