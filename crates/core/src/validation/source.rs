//! Value-source capability: how a field name becomes a current value.
//!
//! The engine never touches a document directly. Callers plug in a
//! [`ValueSource`]; [`MemoryForm`] is the in-memory stand-in used for
//! headless validation and tests.

/// Sentinel text for a checked checkbox/radio group.
pub const CHECKED: &str = "checked";

/// The raw state of a field before it is reduced to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text-like input.
    Text(String),
    /// Checkbox/radio group: `true` if any member is checked.
    Checked(bool),
    /// Values of the selected options.
    Selected(Vec<String>),
}

impl FieldValue {
    /// Reduce to the string form every rule predicate works on.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Checked(true) => CHECKED.to_string(),
            Self::Checked(false) => String::new(),
            Self::Selected(values) => values
                .into_iter()
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Presentation metadata of the element bound to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInfo {
    pub id: String,
    pub class: String,
    /// UI label text, used when the field spec has no label.
    pub label: Option<String>,
}

/// Resolves field names to their current values.
pub trait ValueSource {
    /// Current value of the field, or `None` if no element has this name.
    fn resolve(&self, name: &str) -> Option<FieldValue>;

    /// Metadata of the element bound to `name`.
    fn element(&self, _name: &str) -> Option<ElementInfo> {
        None
    }
}

/// A source that knows no fields. Used when every field carries a literal value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSource;

impl ValueSource for NoSource {
    fn resolve(&self, _name: &str) -> Option<FieldValue> {
        None
    }
}

/// Kind and state of a form element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Text(String),
    Checkbox { checked: bool },
    Radio { checked: bool },
    Select { selected: Vec<String> },
}

/// One element in a [`MemoryForm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormElement {
    pub name: String,
    pub id: String,
    pub class: String,
    pub label: Option<String>,
    pub control: Control,
}

impl FormElement {
    fn new(name: impl Into<String>, control: Control) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            class: String::new(),
            label: None,
            control,
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, Control::Text(value.into()))
    }

    pub fn checkbox(name: impl Into<String>, checked: bool) -> Self {
        Self::new(name, Control::Checkbox { checked })
    }

    pub fn radio(name: impl Into<String>, checked: bool) -> Self {
        Self::new(name, Control::Radio { checked })
    }

    /// A select element; an empty `selected` list (or `[""]`) means the
    /// placeholder option is chosen.
    pub fn select(name: impl Into<String>, selected: Vec<String>) -> Self {
        Self::new(name, Control::Select { selected })
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn is_toggle(&self) -> bool {
        matches!(
            self.control,
            Control::Checkbox { .. } | Control::Radio { .. }
        )
    }
}

/// In-memory form: a flat list of named elements.
///
/// Several elements may share a name (checkbox and radio groups).
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    elements: Vec<FormElement>,
}

impl MemoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, element: FormElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn insert(&mut self, element: FormElement) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[FormElement] {
        &self.elements
    }

    /// Set the value of every text element named `name`.
    ///
    /// Returns `false` if there is none.
    pub fn set_value(&mut self, name: &str, value: &str) -> bool {
        let mut found = false;
        for element in self.elements.iter_mut().filter(|e| e.name == name) {
            if let Control::Text(text) = &mut element.control {
                *text = value.to_string();
                found = true;
            }
        }
        found
    }

    /// Check or uncheck the toggle element with this id.
    ///
    /// Checking a radio unchecks the other radios of its group.
    pub fn set_checked(&mut self, id: &str, checked: bool) -> bool {
        let Some(index) = self.elements.iter().position(|e| e.id == id) else {
            return false;
        };
        let group = self.elements[index].name.clone();
        let is_radio = matches!(self.elements[index].control, Control::Radio { .. });

        if is_radio && checked {
            for element in self.elements.iter_mut().filter(|e| e.name == group) {
                if let Control::Radio { checked } = &mut element.control {
                    *checked = false;
                }
            }
        }

        match &mut self.elements[index].control {
            Control::Checkbox { checked: state } | Control::Radio { checked: state } => {
                *state = checked;
                true
            }
            _ => false,
        }
    }

    /// Replace the selection of the select element named `name`.
    pub fn select(&mut self, name: &str, values: Vec<String>) -> bool {
        match self
            .elements
            .iter_mut()
            .find(|e| e.name == name && matches!(e.control, Control::Select { .. }))
        {
            Some(element) => {
                element.control = Control::Select { selected: values };
                true
            }
            None => false,
        }
    }
}

impl ValueSource for MemoryForm {
    fn resolve(&self, name: &str) -> Option<FieldValue> {
        let mut group = self.elements.iter().filter(|e| e.name == name).peekable();
        let first: &FormElement = *group.peek()?;

        if first.is_toggle() {
            let checked = group.any(|e| {
                matches!(
                    e.control,
                    Control::Checkbox { checked: true } | Control::Radio { checked: true }
                )
            });
            return Some(FieldValue::Checked(checked));
        }

        Some(match &first.control {
            Control::Text(text) => FieldValue::Text(text.clone()),
            Control::Select { selected } => FieldValue::Selected(selected.clone()),
            Control::Checkbox { .. } | Control::Radio { .. } => FieldValue::Checked(false),
        })
    }

    fn element(&self, name: &str) -> Option<ElementInfo> {
        self.elements
            .iter()
            .find(|e| e.name == name)
            .map(|e| ElementInfo {
                id: e.id.clone(),
                class: e.class.clone(),
                label: e.label.clone(),
            })
    }
}
