/// Keyword edits applied by [`replace_text`](crate::replace_text), kept in
/// insertion order.
///
/// A `Some` value replaces every existing chunk for the keyword with a single
/// new one. `None` only removes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEdits {
    entries: Vec<(String, Option<String>)>,
}

impl TextEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, keyword: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.insert(keyword, Some(text.into()))
    }

    pub fn remove(&mut self, keyword: impl Into<String>) -> &mut Self {
        self.insert(keyword, None)
    }

    /// Adds an edit. A keyword that is already present keeps its position and
    /// takes the new value.
    pub fn insert(&mut self, keyword: impl Into<String>, text: Option<String>) -> &mut Self {
        let keyword = keyword.into();
        match self.entries.iter_mut().find(|(k, _)| *k == keyword) {
            Some((_, existing)) => *existing = text,
            None => self.entries.push((keyword, text)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(keyword, text)| (keyword.as_str(), text.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Extend<(K, Option<V>)> for TextEdits
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, Option<V>)>>(&mut self, iter: I) {
        for (keyword, text) in iter {
            self.insert(keyword, text.map(Into::into));
        }
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for TextEdits
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let mut edits = Self::new();
        edits.extend(iter);
        edits
    }
}
