// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Navigation guard policy.
//!
//! Pure routing decisions for the app's pages, driven by two booleans:
//! whether the visitor has a valid session and whether they finished
//! onboarding. The page routes apply this policy server-side; the SPA
//! mirrors it client-side after hydration.

/// Pages the application can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Login,
    Signup,
    Onboarding,
    Friends,
    Notifications,
    Chat,
    Call,
}

impl Page {
    /// URL path for redirects.
    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Login => "/login",
            Page::Signup => "/signup",
            Page::Onboarding => "/onboarding",
            Page::Friends => "/friends",
            Page::Notifications => "/notifications",
            Page::Chat => "/chat",
            Page::Call => "/call",
        }
    }

    /// Pages reachable without a session.
    fn is_public(self) -> bool {
        matches!(self, Page::Login | Page::Signup)
    }
}

/// Session facts the guard decides on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthState {
    pub authenticated: bool,
    pub onboarded: bool,
}

/// Outcome of a guard decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(Page),
}

/// Resolve where a request for `page` should land.
///
/// - No session: everything except login/signup bounces to login.
/// - Session but not onboarded: everything bounces to onboarding.
/// - Onboarded: the auth pages and onboarding bounce home.
pub fn resolve(page: Page, auth: AuthState) -> RouteDecision {
    if !auth.authenticated {
        if page.is_public() {
            return RouteDecision::Allow;
        }
        return RouteDecision::Redirect(Page::Login);
    }

    if !auth.onboarded {
        if page == Page::Onboarding {
            return RouteDecision::Allow;
        }
        return RouteDecision::Redirect(Page::Onboarding);
    }

    if page.is_public() || page == Page::Onboarding {
        return RouteDecision::Redirect(Page::Home);
    }

    RouteDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PAGES: [Page; 8] = [
        Page::Home,
        Page::Login,
        Page::Signup,
        Page::Onboarding,
        Page::Friends,
        Page::Notifications,
        Page::Chat,
        Page::Call,
    ];

    #[test]
    fn test_unauthenticated_always_lands_on_login() {
        // Holds regardless of the onboarded bit
        for onboarded in [false, true] {
            let auth = AuthState {
                authenticated: false,
                onboarded,
            };
            for page in ALL_PAGES {
                let decision = resolve(page, auth);
                if page.is_public() {
                    assert_eq!(decision, RouteDecision::Allow, "{:?}", page);
                } else {
                    assert_eq!(decision, RouteDecision::Redirect(Page::Login), "{:?}", page);
                }
            }
        }
    }

    #[test]
    fn test_not_onboarded_is_funneled_to_onboarding() {
        let auth = AuthState {
            authenticated: true,
            onboarded: false,
        };
        for page in ALL_PAGES {
            let expected = if page == Page::Onboarding {
                RouteDecision::Allow
            } else {
                RouteDecision::Redirect(Page::Onboarding)
            };
            assert_eq!(resolve(page, auth), expected, "{:?}", page);
        }
    }

    #[test]
    fn test_onboarded_user_cannot_revisit_auth_pages() {
        let auth = AuthState {
            authenticated: true,
            onboarded: true,
        };
        for page in [Page::Login, Page::Signup, Page::Onboarding] {
            assert_eq!(resolve(page, auth), RouteDecision::Redirect(Page::Home));
        }
        for page in [Page::Home, Page::Friends, Page::Notifications, Page::Chat, Page::Call] {
            assert_eq!(resolve(page, auth), RouteDecision::Allow, "{:?}", page);
        }
    }
}
