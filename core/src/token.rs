//! Array items and ordered item sequences.
//!
//! A [`TokenList`] owns its items. Each [`TokenModel`] keeps only a weak
//! back-reference to the list it currently lives in, which is how an item
//! finds its own position. The list maintains that reference on every
//! insert and removal.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use json_form_schema::Schema;
use serde_json::Value;

use crate::error::{ModelError, Result};
use crate::events::{ChangeStream, ListChange, Subscription};
use crate::object::ObjectModel;
use crate::types::Scalar;

/// Content of one array item.
#[derive(Debug, Clone)]
pub enum Token {
    Object(Rc<ObjectModel>),
    /// Nested array.
    Array(Rc<TokenList>),
    /// Scalar item; `None` is a JSON `null`.
    Value(Option<Scalar>),
}

impl Token {
    pub fn to_json(&self) -> Value {
        match self {
            Token::Object(object) => object.to_json(),
            Token::Array(list) => list.to_json(),
            Token::Value(Some(scalar)) => scalar.to_json(),
            Token::Value(None) => Value::Null,
        }
    }
}

/// One array item.
pub struct TokenModel {
    token: RefCell<Token>,
    schema: RefCell<Option<Schema>>,
    parent: RefCell<Weak<TokenList>>,
}

impl TokenModel {
    /// Creates a detached item.
    pub fn new(token: Token, schema: Option<Schema>) -> Rc<Self> {
        Rc::new(Self {
            token: RefCell::new(token),
            schema: RefCell::new(schema),
            parent: RefCell::new(Weak::new()),
        })
    }

    /// Creates a detached scalar item.
    pub fn value(value: impl Into<Scalar>, schema: Option<Schema>) -> Rc<Self> {
        Self::new(Token::Value(Some(value.into())), schema)
    }

    pub fn token(&self) -> Token {
        self.token.borrow().clone()
    }

    pub fn set_token(&self, token: Token) {
        *self.token.borrow_mut() = token;
    }

    /// The item schema this token was built against.
    pub fn schema(&self) -> Option<Schema> {
        self.schema.borrow().clone()
    }

    pub fn set_schema(&self, schema: Option<Schema>) {
        *self.schema.borrow_mut() = schema;
    }

    /// The list this item currently lives in.
    pub fn parent_list(&self) -> Option<Rc<TokenList>> {
        self.parent.borrow().upgrade()
    }

    /// Zero-based position inside the owning list.
    pub fn index(self: &Rc<Self>) -> Option<usize> {
        self.parent_list()?.index_of(self)
    }

    /// One-based position, as shown next to each entry of a form.
    pub fn ordinal(self: &Rc<Self>) -> Option<usize> {
        self.index().map(|index| index + 1)
    }

    pub fn to_json(&self) -> Value {
        self.token.borrow().to_json()
    }

    fn attach(&self, list: &Rc<TokenList>) {
        *self.parent.borrow_mut() = Rc::downgrade(list);
    }

    fn detach(&self) {
        *self.parent.borrow_mut() = Weak::new();
    }
}

impl fmt::Debug for TokenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenModel")
            .field("token", &self.token.borrow())
            .field("attached", &(self.parent.borrow().strong_count() > 0))
            .finish()
    }
}

/// Ordered, observable sequence of array items.
///
/// # Examples
///
/// ```
/// use json_form_core::{TokenList, TokenModel};
///
/// let list = TokenList::new();
/// let a = TokenModel::value("a", None);
/// let b = TokenModel::value("b", None);
/// list.push(&a);
/// list.push(&b);
/// assert_eq!(b.ordinal(), Some(2));
///
/// list.remove(0);
/// assert!(a.parent_list().is_none());
/// assert_eq!(b.ordinal(), Some(1));
/// ```
pub struct TokenList {
    items: RefCell<Vec<Rc<TokenModel>>>,
    changes: ChangeStream<ListChange>,
}

impl TokenList {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            items: RefCell::new(Vec::new()),
            changes: ChangeStream::new(),
        })
    }

    /// Builds a list from `items`, pointing every item back at it.
    pub fn from_items(items: Vec<Rc<TokenModel>>) -> Rc<Self> {
        let list = Self::new();
        for item in &items {
            item.attach(&list);
        }
        *list.items.borrow_mut() = items;
        list
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Rc<TokenModel>> {
        self.items.borrow().get(index).cloned()
    }

    /// Snapshot of the current items.
    pub fn items(&self) -> Vec<Rc<TokenModel>> {
        self.items.borrow().clone()
    }

    pub fn index_of(&self, item: &Rc<TokenModel>) -> Option<usize> {
        self.items
            .borrow()
            .iter()
            .position(|candidate| Rc::ptr_eq(candidate, item))
    }

    /// Appends `item`, moving it out of any list it lived in before.
    pub fn push(self: &Rc<Self>, item: &Rc<TokenModel>) {
        release(item);
        let index = {
            let mut items = self.items.borrow_mut();
            items.push(Rc::clone(item));
            items.len() - 1
        };
        item.attach(self);
        self.changes.emit(&ListChange::Inserted(index));
    }

    /// Inserts `item` at `index`, moving it out of any list it lived in
    /// before.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] if `index > len` (measured
    /// after the item has left its previous list). The item is left where
    /// it was.
    pub fn insert(self: &Rc<Self>, index: usize, item: &Rc<TokenModel>) -> Result<()> {
        let moving_within = item.parent_list().is_some_and(|list| Rc::ptr_eq(&list, self));
        let len = self.len() - usize::from(moving_within);
        if index > len {
            return Err(ModelError::IndexOutOfRange { index, len });
        }
        release(item);
        self.items.borrow_mut().insert(index, Rc::clone(item));
        item.attach(self);
        self.changes.emit(&ListChange::Inserted(index));
        Ok(())
    }

    /// Removes and returns the item at `index`; its back-reference is
    /// cleared.
    pub fn remove(&self, index: usize) -> Option<Rc<TokenModel>> {
        let removed = {
            let mut items = self.items.borrow_mut();
            (index < items.len()).then(|| items.remove(index))
        }?;
        removed.detach();
        self.changes.emit(&ListChange::Removed(index));
        Some(removed)
    }

    /// Removes `item` if it lives in this list.
    pub fn remove_item(&self, item: &Rc<TokenModel>) -> bool {
        match self.index_of(item) {
            Some(index) => self.remove(index).is_some(),
            None => false,
        }
    }

    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&ListChange) + 'static) -> Subscription<ListChange> {
        self.changes.subscribe(listener)
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.items.borrow().iter().map(|item| item.to_json()).collect())
    }
}

fn release(item: &Rc<TokenModel>) {
    if let Some(previous) = item.parent_list() {
        previous.remove_item(item);
    }
}

impl fmt::Debug for TokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.borrow().iter()).finish()
    }
}
