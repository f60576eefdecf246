use std::collections::HashMap;

use crate::{
    ast::types::DataType,
    errors::errors::{AlreadyDeclared, SymbolKind},
    type_system::type_system::Type,
};

/// Index of a scope inside its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub parameters: Vec<(String, DataType)>,
    /// Inferred from `return` statements, `None` until one has been seen.
    pub return_type: Option<Type>,
    /// The function's own scope.
    pub body: Option<ScopeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub ty: DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDecl {
    pub ty: DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Function(FunctionDecl),
    Variable(VariableDecl),
    Parameter(ParameterDecl),
}

impl Symbol {
    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Function(_) => SymbolKind::Function,
            Symbol::Variable(_) => SymbolKind::Variable,
            Symbol::Parameter(_) => SymbolKind::Parameter,
        }
    }

    /// Declared type of a variable or parameter.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Symbol::Variable(VariableDecl { ty }) | Symbol::Parameter(ParameterDecl { ty }) => {
                Some(*ty)
            }
            Symbol::Function(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub symbols: HashMap<String, Symbol>,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Name of the function owning this scope, `None` for the global scope.
    pub function: Option<String>,
}

/// Arena of nested scopes.
///
/// Scopes refer to their parent by id, the tree owns every scope. Index 0 is
/// always the global scope.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope::default()],
        }
    }

    /// Creates a scope below `parent` (or a detached root when `None`).
    pub fn create(&mut self, parent: Option<ScopeId>, function: Option<&str>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            symbols: HashMap::new(),
            parent,
            children: vec![],
            function: function.map(str::to_string),
        });
        if let Some(parent) = parent {
            self.scopes[parent.0].children.push(id);
        }
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scopes[id.0].parent
    }

    pub fn children(&self, id: ScopeId) -> &[ScopeId] {
        &self.scopes[id.0].children
    }

    pub fn owning_function(&self, id: ScopeId) -> Option<&str> {
        self.scopes[id.0].function.as_deref()
    }

    /// Declares `name` in `scope`. Ancestors are not consulted, so shadowing
    /// an outer name is fine.
    pub fn declare(&mut self, scope: ScopeId, name: &str, symbol: Symbol) -> Result<(), AlreadyDeclared> {
        let target = &mut self.scopes[scope.0];
        if let Some(existing) = target.symbols.get(name) {
            return Err(AlreadyDeclared {
                name: name.to_string(),
                scope_context: target
                    .function
                    .clone()
                    .unwrap_or_else(|| String::from("global")),
                prior: existing.kind(),
            });
        }
        target.symbols.insert(name.to_string(), symbol);
        Ok(())
    }

    /// Innermost variable or parameter called `name`. Function entries are
    /// skipped, they live in their own namespace.
    pub fn resolve_variable(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.ancestors(scope).find_map(|id| {
            self.scopes[id.0]
                .symbols
                .get(name)
                .filter(|symbol| !matches!(symbol, Symbol::Function(_)))
        })
    }

    /// Innermost function called `name`, skipping variables and parameters.
    pub fn resolve_function(&self, scope: ScopeId, name: &str) -> Option<&FunctionDecl> {
        self.ancestors(scope).find_map(|id| match self.scopes[id.0].symbols.get(name) {
            Some(Symbol::Function(function)) => Some(function),
            _ => None,
        })
    }

    pub fn resolve_function_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut FunctionDecl> {
        let owner = self.ancestors(scope).find(|id| {
            matches!(self.scopes[id.0].symbols.get(name), Some(Symbol::Function(_)))
        })?;
        match self.scopes[owner.0].symbols.get_mut(name) {
            Some(Symbol::Function(function)) => Some(function),
            _ => None,
        }
    }

    /// Scope of the function called `name`, as recorded on its declaration.
    pub fn function_scope(&self, name: &str) -> Option<ScopeId> {
        self.resolve_function(Self::GLOBAL, name)
            .and_then(|function| function.body)
    }

    fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), move |id| self.scopes[id.0].parent)
    }
}
