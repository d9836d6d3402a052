//! Client-held storefront state: the cart and the signed-in principal.
//!
//! Front ends hold one session object per visitor and pass it explicitly
//! instead of keeping the cart and the token in globals.

use thiserror::Error;

use crate::{
    dto::orders::{CartLine, CheckoutRequest, OrderContact},
    middleware::auth::Principal,
    services::order_service::{line_amount, round_money},
};

#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub principal: Principal,
    pub display_name: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("sign in before checking out")]
    NotLoggedIn,
}

/// What `add_item` did to the cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartChange {
    Added,
    /// Same variant already present; quantities were summed.
    Merged,
    /// Another variant of the product was in the cart and has been dropped.
    Replaced(CartLine),
}

pub trait StorefrontSession {
    fn cart(&self) -> &[CartLine];

    /// Adds a line. An order holds each product once, so a product already
    /// in the cart is merged: same variant adds quantities, another variant
    /// replaces the line and hands the old one back.
    fn add_item(&mut self, line: CartLine) -> CartChange;

    /// Returns whether a line was removed.
    fn remove_item(&mut self, product_id: i32) -> bool;

    fn user(&self) -> Option<&AuthSession>;

    fn login(&mut self, auth: AuthSession);

    fn logout(&mut self);

    fn clear_cart(&mut self);

    fn cart_total(&self) -> f64 {
        round_money(
            self.cart()
                .iter()
                .map(|line| line_amount(line.price, line.quantity))
                .sum(),
        )
    }

    fn authorization_header(&self) -> Option<String> {
        self.user().map(|auth| format!("Bearer {}", auth.token))
    }

    fn checkout_request(&self, contact: OrderContact) -> Result<CheckoutRequest, SessionError> {
        if self.user().is_none() {
            return Err(SessionError::NotLoggedIn);
        }
        if self.cart().is_empty() {
            return Err(SessionError::EmptyCart);
        }
        Ok(CheckoutRequest {
            contact,
            products: self.cart().to_vec(),
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemorySession {
    cart: Vec<CartLine>,
    auth: Option<AuthSession>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorefrontSession for MemorySession {
    fn cart(&self) -> &[CartLine] {
        &self.cart
    }

    fn add_item(&mut self, line: CartLine) -> CartChange {
        match self
            .cart
            .iter_mut()
            .find(|existing| existing.product_id == line.product_id)
        {
            Some(existing) if existing.color == line.color && existing.size == line.size => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
                existing.price = line.price;
                CartChange::Merged
            }
            Some(existing) => CartChange::Replaced(std::mem::replace(existing, line)),
            None => {
                self.cart.push(line);
                CartChange::Added
            }
        }
    }

    fn remove_item(&mut self, product_id: i32) -> bool {
        let before = self.cart.len();
        self.cart.retain(|line| line.product_id != product_id);
        self.cart.len() != before
    }

    fn user(&self) -> Option<&AuthSession> {
        self.auth.as_ref()
    }

    fn login(&mut self, auth: AuthSession) {
        self.auth = Some(auth);
    }

    fn logout(&mut self) {
        self.auth = None;
    }

    fn clear_cart(&mut self) {
        self.cart.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i32, quantity: i32, color: Option<&str>) -> CartLine {
        CartLine {
            product_id,
            quantity,
            price: 10.5,
            color: color.map(str::to_string),
            size: Some("M".into()),
        }
    }

    fn contact() -> OrderContact {
        OrderContact {
            first_name: "Amina".into(),
            last_name: "B".into(),
            phone: "0600000000".into(),
            city: "Rabat".into(),
            address: "1 rue X".into(),
        }
    }

    fn signed_in() -> MemorySession {
        let mut session = MemorySession::new();
        session.login(AuthSession {
            token: "tok".into(),
            principal: Principal::user(4),
            display_name: "Amina".into(),
        });
        session
    }

    #[test]
    fn same_variant_merges_quantities() {
        let mut session = MemorySession::new();
        assert_eq!(session.add_item(line(1, 1, Some("Noir"))), CartChange::Added);
        assert_eq!(session.add_item(line(1, 2, Some("Noir"))), CartChange::Merged);
        assert_eq!(session.cart().len(), 1);
        assert_eq!(session.cart()[0].quantity, 3);
        assert_eq!(session.cart_total(), 31.5);
    }

    #[test]
    fn other_variant_replaces_line() {
        let mut session = MemorySession::new();
        session.add_item(line(1, 2, Some("Noir")));
        let change = session.add_item(line(1, 1, Some("Blanc")));
        assert_eq!(change, CartChange::Replaced(line(1, 2, Some("Noir"))));
        assert_eq!(session.cart().len(), 1);
        assert_eq!(session.cart()[0].color.as_deref(), Some("Blanc"));
        assert_eq!(session.cart()[0].quantity, 1);
    }

    #[test]
    fn merged_quantity_saturates() {
        let mut session = MemorySession::new();
        session.add_item(line(1, i32::MAX, None));
        session.add_item(line(1, 5, None));
        assert_eq!(session.cart()[0].quantity, i32::MAX);
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let mut session = MemorySession::new();
        session.add_item(line(1, 1, None));
        assert!(session.remove_item(1));
        assert!(!session.remove_item(1));
    }

    #[test]
    fn checkout_requires_login_and_items() {
        let mut session = MemorySession::new();
        session.add_item(line(1, 1, None));
        assert_eq!(
            session.checkout_request(contact()).unwrap_err(),
            SessionError::NotLoggedIn
        );

        let mut session = signed_in();
        assert_eq!(
            session.checkout_request(contact()).unwrap_err(),
            SessionError::EmptyCart
        );

        session.add_item(line(2, 2, None));
        let request = session.checkout_request(contact()).unwrap();
        assert_eq!(request.products, session.cart().to_vec());
        assert_eq!(session.authorization_header().as_deref(), Some("Bearer tok"));
    }

    #[test]
    fn logout_keeps_cart() {
        let mut session = signed_in();
        session.add_item(line(1, 1, None));
        session.logout();
        assert!(session.user().is_none());
        assert_eq!(session.cart().len(), 1);
    }
}
