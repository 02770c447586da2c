use inventory_core::{Field, RawFields, ValidationFlags};

const MAX_INPUT_LEN: usize = 64;

/// Single-line text input with a character cursor.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    input: String,
    cursor: usize,
}

impl TextInput {
    pub fn with_value(value: &str) -> Self {
        let mut input = Self::default();
        input.set(value);
        input
    }

    pub fn value(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, value: &str) {
        self.input = value.chars().take(MAX_INPUT_LEN).collect();
        self.cursor = self.input.chars().count();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.input.chars().count() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    pub fn insert(&mut self, ch: char) {
        if ch.is_control() || self.input.chars().count() >= MAX_INPUT_LEN {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.input.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.input.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let at = self.byte_offset(self.cursor);
            self.input.remove(at);
        }
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.input
            .char_indices()
            .nth(chars)
            .map(|(index, _)| index)
            .unwrap_or(self.input.len())
    }
}

/// Add-product form: one input per field plus the flags of the last submit.
#[derive(Debug, Clone, Default)]
pub struct AddForm {
    inputs: [TextInput; 3],
    focus: usize,
    flags: ValidationFlags,
}

impl AddForm {
    pub fn fields(&self) -> impl Iterator<Item = (Field, &TextInput)> {
        Field::ALL.into_iter().zip(self.inputs.iter())
    }

    pub fn focused_field(&self) -> Field {
        Field::ALL[self.focus]
    }

    pub fn focused(&mut self) -> &mut TextInput {
        &mut self.inputs[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.inputs.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.inputs.len() - 1) % self.inputs.len();
    }

    pub fn flags(&self) -> &ValidationFlags {
        &self.flags
    }

    pub fn set_flags(&mut self, flags: ValidationFlags) {
        self.flags = flags;
    }

    /// Inputs keyed the way a form submission names them.
    pub fn submission(&self) -> RawFields {
        self.fields().fold(RawFields::new(), |raw, (field, input)| {
            raw.with(field.form_key(), input.value())
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_multibyte_text() {
        let mut input = TextInput::with_value("Caf");
        input.insert('é');
        input.move_home();
        input.insert('>');
        assert_eq!(input.value(), ">Café");
        input.move_end();
        input.backspace();
        assert_eq!(input.value(), ">Caf");
        input.move_home();
        input.delete();
        assert_eq!(input.value(), "Caf");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut input = TextInput::with_value("ab");
        input.move_cursor(10);
        assert_eq!(input.cursor(), 2);
        input.move_cursor(-10);
        assert_eq!(input.cursor(), 0);
        input.backspace();
        assert_eq!(input.value(), "ab");
    }

    #[test]
    fn submission_uses_form_keys() {
        let mut form = AddForm::default();
        "Widget".chars().for_each(|ch| form.focused().insert(ch));
        form.focus_next();
        form.focused().insert('5');
        form.focus_next();
        "2.5".chars().for_each(|ch| form.focused().insert(ch));

        let raw = form.submission();
        assert_eq!(raw.get("input_name"), Some("Widget"));
        assert_eq!(raw.get("input_qty"), Some("5"));
        assert_eq!(raw.get("input_price"), Some("2.5"));

        form.focus_next();
        assert_eq!(form.focused_field(), Field::Name);
        form.focus_prev();
        assert_eq!(form.focused_field(), Field::Price);
    }
}
