use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use ratatui::text::{Line, Span};

use super::{
    active_style, answer_style, error_line, message_line, Key, Keystroke, LineState, Prompt,
    Status,
};

const NO_MATCH: &str = "No matching choice";

pub struct Choice<T> {
    pub name: String,
    pub value: T,
}

impl<T> Choice<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// When a synthetic "create" choice is offered for the typed term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatePolicy {
    /// Only when nothing else matches, listed last.
    WhenNoMatch,
    /// Whenever a term is typed (or nothing matches), listed first.
    WhenTyped,
}

pub struct CreateChoice<T> {
    pub policy: CreatePolicy,
    make: Box<dyn Fn(&str) -> Choice<T>>,
}

impl<T> CreateChoice<T> {
    pub fn new(policy: CreatePolicy, make: impl Fn(&str) -> Choice<T> + 'static) -> Self {
        Self {
            policy,
            make: Box::new(make),
        }
    }

    fn offered(&self, term: &str, matches: usize) -> bool {
        match self.policy {
            CreatePolicy::WhenNoMatch => matches == 0,
            CreatePolicy::WhenTyped => matches == 0 || !term.is_empty(),
        }
    }
}

pub struct SearchConfig<T> {
    pub message: String,
    pub choices: Vec<Choice<T>>,
    pub page_size: usize,
    pub searchable: bool,
    pub create: Option<CreateChoice<T>>,
}

impl<T> SearchConfig<T> {
    pub fn new(message: impl Into<String>, choices: Vec<Choice<T>>) -> Self {
        Self {
            message: message.into(),
            choices,
            page_size: 10,
            searchable: true,
            create: None,
        }
    }

    /// A plain select list: typing does not filter.
    pub fn select(message: impl Into<String>, choices: Vec<Choice<T>>) -> Self {
        Self {
            searchable: false,
            ..Self::new(message, choices)
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn create(
        mut self,
        policy: CreatePolicy,
        make: impl Fn(&str) -> Choice<T> + 'static,
    ) -> Self {
        self.create = Some(CreateChoice::new(policy, make));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Existing(usize),
    Created,
}

/// Pick one value from a list, narrowing it down by typing.
pub struct SearchPrompt<T> {
    config: SearchConfig<T>,
    query: LineState,
    entries: Vec<Entry>,
    created: Option<Choice<T>>,
    cursor: usize,
    picked: Option<Entry>,
    status: Status,
    error: Option<String>,
}

impl<T> SearchPrompt<T> {
    pub fn new(config: SearchConfig<T>) -> Self {
        let mut prompt = Self {
            config,
            query: LineState::default(),
            entries: Vec::new(),
            created: None,
            cursor: 0,
            picked: None,
            status: Status::Idle,
            error: None,
        };
        prompt.refilter();
        prompt
    }

    pub fn query(&self) -> &str {
        &self.query.value
    }

    /// Names of the choices currently listed, in display order.
    pub fn visible_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| self.name_of(*e)).collect()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(|e| self.name_of(*e))
    }

    fn name_of(&self, entry: Entry) -> &str {
        match entry {
            Entry::Existing(i) => &self.config.choices[i].name,
            Entry::Created => self.created.as_ref().map(|c| c.name.as_str()).unwrap_or(""),
        }
    }

    fn refilter(&mut self) {
        let term = self.query.value.as_str();
        let matches: Vec<usize> = if term.is_empty() {
            (0..self.config.choices.len()).collect()
        } else {
            let matcher = SkimMatcherV2::default();
            let mut scored: Vec<(usize, i64)> = self
                .config
                .choices
                .iter()
                .enumerate()
                .filter_map(|(i, choice)| {
                    matcher.fuzzy_match(&choice.name, term).map(|score| (i, score))
                })
                .collect();
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            scored.into_iter().map(|(i, _)| i).collect()
        };

        self.created = self
            .config
            .create
            .as_ref()
            .filter(|create| create.offered(term, matches.len()))
            .map(|create| (create.make)(term));

        let existing = matches.into_iter().map(Entry::Existing);
        self.entries = match (&self.created, &self.config.create) {
            (Some(_), Some(create)) if create.policy == CreatePolicy::WhenTyped => {
                std::iter::once(Entry::Created).chain(existing).collect()
            }
            (Some(_), _) => existing.chain(std::iter::once(Entry::Created)).collect(),
            (None, _) => existing.collect(),
        };
        self.cursor = 0;
    }

    fn edit_query(&mut self, edit: impl FnOnce(&mut LineState)) {
        if !self.config.searchable {
            return;
        }
        edit(&mut self.query);
        self.error = None;
        self.refilter();
    }

    /// First entry of the visible page.
    fn page_start(&self) -> usize {
        let page = self.config.page_size.max(1);
        if self.cursor < page {
            0
        } else {
            self.cursor + 1 - page
        }
    }
}

impl<T> Prompt for SearchPrompt<T> {
    type Output = T;

    fn status(&self) -> Status {
        self.status
    }

    fn on_key(mut self, key: Keystroke) -> Self {
        if self.status != Status::Idle {
            return self;
        }

        let len = self.entries.len();
        match key.key {
            Key::Enter => self.status = Status::Loading,
            Key::Up if len > 0 => self.cursor = (self.cursor + len - 1) % len,
            Key::Down if len > 0 => self.cursor = (self.cursor + 1) % len,
            Key::Backspace => self.edit_query(LineState::backspace),
            Key::Delete => self.edit_query(LineState::delete),
            Key::Char(c) => self.edit_query(|line| line.insert(c)),
            _ => {}
        }
        self
    }

    fn resolve(mut self) -> Self {
        if self.status != Status::Loading {
            return self;
        }

        match self.entries.get(self.cursor) {
            Some(entry) => {
                self.picked = Some(*entry);
                self.error = None;
                self.status = Status::Done;
            }
            None => {
                tracing::debug!(query = %self.query.value, "nothing to pick");
                self.error = Some(NO_MATCH.to_string());
                self.status = Status::Idle;
            }
        }
        self
    }

    fn render(&self) -> Vec<Line<'static>> {
        let mut header = message_line(self.status, &self.config.message);

        if self.status == Status::Done {
            let name = self.picked.map(|e| self.name_of(e)).unwrap_or_default();
            header.push(Span::raw(" "));
            header.push(Span::styled(name.to_string(), answer_style()));
            return vec![Line::from(header)];
        }

        if self.config.searchable {
            header.push(Span::raw(format!(" {}█", self.query.value)));
        }

        let mut lines = vec![Line::from(header)];
        let start = self.page_start();
        for (i, entry) in self
            .entries
            .iter()
            .enumerate()
            .skip(start)
            .take(self.config.page_size)
        {
            let name = self.name_of(*entry);
            if i == self.cursor {
                lines.push(Line::from(Span::styled(format!("❯ {name}"), active_style())));
            } else {
                lines.push(Line::from(format!("  {name}")));
            }
        }
        lines.extend(error_line(&self.error));
        lines
    }

    fn height(&self) -> u16 {
        u16::try_from(self.config.page_size + 2).unwrap_or(u16::MAX)
    }

    fn into_output(mut self) -> Option<T> {
        if self.status != Status::Done {
            return None;
        }
        match self.picked? {
            Entry::Existing(i) => Some(self.config.choices.swap_remove(i).value),
            Entry::Created => self.created.take().map(|c| c.value),
        }
    }
}
