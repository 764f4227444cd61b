use crate::driver::common::{css_string, xpath_literal};
use crate::error::{HarnessError, HarnessResult};
use async_trait::async_trait;
use std::fmt;

/// Declarative element selector.
///
/// Every variant renders to exactly one driver selector string through
/// [`Selector::to_driver_selector`], so quoting lives in one place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Raw CSS selector, passed through untouched
    Css(String),
    /// Raw XPath expression
    XPath(String),
    /// Element id (rendered as an attribute match, so ids need no CSS escaping)
    Id(String),
    /// Innermost element(s) whose normalized text contains the given string
    TextContains(String),
    /// Element carrying `name="value"`
    Attribute { name: String, value: String },
}

impl Selector {
    pub fn css(css: impl Into<String>) -> Self {
        Selector::Css(css.into())
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Selector::XPath(xpath.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Selector::Id(id.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Selector::TextContains(text.into())
    }

    pub fn attr(name: impl Into<String>, value: impl Into<String>) -> Self {
        Selector::Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Convert to a Playwright selector string
    pub fn to_driver_selector(&self) -> String {
        match self {
            Selector::Css(css) => css.clone(),
            Selector::XPath(xpath) => format!("xpath={}", xpath),
            Selector::Id(id) => format!("[id={}]", css_string(id)),
            Selector::TextContains(text) => {
                let literal = xpath_literal(text);
                // Innermost match only: the element contains the text but none of its children do.
                format!(
                    "xpath=//*[contains(normalize-space(.), {lit}) and not(*[contains(normalize-space(.), {lit})])]",
                    lit = literal
                )
            }
            Selector::Attribute { name, value } => format!("[{}={}]", name, css_string(value)),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => write!(f, "css `{}`", css),
            Selector::XPath(xpath) => write!(f, "xpath `{}`", xpath),
            Selector::Id(id) => write!(f, "#{}", id),
            Selector::TextContains(text) => write!(f, "text containing {:?}", text),
            Selector::Attribute { name, value } => write!(f, "[{}={:?}]", name, value),
        }
    }
}

/// One resolved match of a selector. Re-resolved by the driver on use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    pub selector: Selector,
    pub index: usize,
}

/// Outcome of looking up a single element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(ElementRef),
    NotFound,
}

impl Lookup {
    /// Treat absence as a failure.
    pub fn required(self, selector: &Selector) -> HarnessResult<ElementRef> {
        match self {
            Lookup::Found(el) => Ok(el),
            Lookup::NotFound => Err(HarnessError::ElementNotFound(selector.to_string())),
        }
    }
}

/// Writes that bypass native form constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawAttribute {
    /// Drop an attribute such as `required` or `min`
    Remove(String),
    /// Set an attribute verbatim
    Set(String, String),
    /// Drop `min`, assign `.value` directly and fire `input` + `change`.
    /// Needed for native date/time pickers that ignore keystrokes.
    ForceValue(String),
}

/// Element interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Click,
    TypeText(String),
    ClearValue,
    SetAttributeRaw(RawAttribute),
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interaction::Click => write!(f, "click"),
            Interaction::TypeText(text) => write!(f, "type {:?}", text),
            Interaction::ClearValue => write!(f, "clear"),
            Interaction::SetAttributeRaw(RawAttribute::Remove(name)) => {
                write!(f, "remove attribute {}", name)
            }
            Interaction::SetAttributeRaw(RawAttribute::Set(name, value)) => {
                write!(f, "set attribute {}={:?}", name, value)
            }
            Interaction::SetAttributeRaw(RawAttribute::ForceValue(value)) => {
                write!(f, "force value {:?}", value)
            }
        }
    }
}

/// Browser session interface consumed by the poller and the scenario runner.
///
/// Implementations must keep read operations (`current_url`, `locate`,
/// `body_text`, `validation_messages`) free of side effects: the poller calls
/// them many times per wait.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Base URL relative paths are resolved against
    fn base_url(&self) -> &str;

    /// Load a URL. Does not wait for the application to settle.
    async fn navigate(&self, url: &str) -> HarnessResult<()>;

    async fn current_url(&self) -> HarnessResult<String>;

    /// Resolve a selector to all of its current matches, in document order
    async fn locate(&self, selector: &Selector) -> HarnessResult<Vec<ElementRef>>;

    async fn locate_first(&self, selector: &Selector) -> HarnessResult<Lookup> {
        Ok(match self.locate(selector).await?.into_iter().next() {
            Some(el) => Lookup::Found(el),
            None => Lookup::NotFound,
        })
    }

    async fn is_present(&self, selector: &Selector) -> HarnessResult<bool> {
        Ok(!self.locate(selector).await?.is_empty())
    }

    async fn interact(&self, element: &ElementRef, action: &Interaction) -> HarnessResult<()>;

    /// Rendered text of one element
    async fn element_text(&self, element: &ElementRef) -> HarnessResult<String>;

    /// `validationMessage` of every element currently matching `:invalid`,
    /// empty messages omitted
    async fn validation_messages(&self) -> HarnessResult<Vec<String>>;

    /// Visible text of the document body
    async fn body_text(&self) -> HarnessResult<String>;

    /// Drop cookies and web storage, used to switch roles between logins
    async fn clear_cookies(&self) -> HarnessResult<()>;

    /// Release the browser. Called exactly once per started session.
    async fn close(&self) -> HarnessResult<()>;
}
