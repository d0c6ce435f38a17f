//! Symbol tables: where a name is declared and where it is referenced.

use crate::errors::{Error, Result};
use crate::fs::InputFile;
use crate::sensor::storage::SensorStorage;
use crate::text::TextRange;
use serde::Serialize;
use std::path::PathBuf;

/// Handle to a symbol declared through [`SymbolTableBuilder::declare_symbol`].
/// Only valid for the builder that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolId(usize);

#[derive(Clone, Debug, Serialize)]
pub struct Symbol {
    declaration: TextRange,
    references: Vec<TextRange>,
}

impl Symbol {
    pub fn declaration(&self) -> &TextRange {
        &self.declaration
    }

    pub fn references(&self) -> &[TextRange] {
        &self.references
    }
}

/// All symbols of one file, ordered by declaration position.
#[derive(Clone, Debug, Serialize)]
pub struct SymbolTable {
    file: PathBuf,
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn file(&self) -> &PathBuf {
        &self.file
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

/// Builder for one file's symbol table, obtained from the sensor context.
pub struct SymbolTableBuilder<'a> {
    storage: &'a mut dyn SensorStorage,
    file: &'a InputFile,
    symbols: Vec<Symbol>,
}

impl<'a> SymbolTableBuilder<'a> {
    pub(crate) fn new(storage: &'a mut dyn SensorStorage, file: &'a InputFile) -> Self {
        Self {
            storage,
            file,
            symbols: Vec::new(),
        }
    }

    /// Record a declaration and get a handle for attaching references.
    pub fn declare_symbol(&mut self, declaration: TextRange) -> Result<SymbolId> {
        self.file.validate_range(&declaration)?;
        self.symbols.push(Symbol {
            declaration,
            references: Vec::new(),
        });
        Ok(SymbolId(self.symbols.len() - 1))
    }

    /// Attach a reference to a previously declared symbol. A reference may
    /// not overlap the declaration itself.
    pub fn add_reference(&mut self, symbol: SymbolId, reference: TextRange) -> Result<()> {
        self.file.validate_range(&reference)?;
        let entry = self.symbols.get_mut(symbol.0).ok_or_else(|| {
            Error::validation("symbol reference uses a handle from another builder")
        })?;
        if entry.declaration.overlaps(&reference) {
            return Err(Error::validation(format!(
                "reference {} overlaps the declaration {} in {}",
                reference,
                entry.declaration,
                self.file.relative_path().display()
            )));
        }
        entry.references.push(reference);
        Ok(())
    }

    pub fn save(self) -> Result<()> {
        let mut symbols = self.symbols;
        for symbol in &mut symbols {
            symbol.references.sort();
            symbol.references.dedup();
        }
        symbols.sort_by(|a, b| a.declaration.start.cmp(&b.declaration.start));
        self.storage.store_symbol_table(SymbolTable {
            file: self.file.relative_path().to_path_buf(),
            symbols,
        })
    }
}
