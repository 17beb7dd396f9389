use crate::{error::ModelError, field::FieldSet, types::TypeRef};

use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FunctionDef {
    name:        String,
    return_type: TypeRef,
    oneway:      bool,
    args:        FieldSet,
    throws:      FieldSet,
    docs:        Option<Vec<String>>,
}

impl FunctionDef {
    pub fn new(
        name: &str,
        return_type: TypeRef,
        oneway: bool,
        args: FieldSet,
        throws: FieldSet,
        docs: Option<Vec<String>>,
    ) -> Self {
        FunctionDef {
            name: name.to_string(),
            return_type,
            oneway,
            args,
            throws,
            docs,
        }
    }

    /// Owner label for the argument list of `service.function`.
    pub fn args_owner(service_qname: &str, name: &str) -> String {
        format!("{}.{}.<args>", service_qname, name)
    }

    pub fn throws_owner(service_qname: &str, name: &str) -> String {
        format!("{}.{}.<throws>", service_qname, name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    pub fn is_oneway(&self) -> bool {
        self.oneway
    }

    pub fn args(&self) -> &FieldSet {
        &self.args
    }

    pub fn throws(&self) -> &FieldSet {
        &self.throws
    }

    pub fn doc_comments(&self) -> Option<&[String]> {
        self.docs.as_deref()
    }
}

/// A service with at most one super service.
///
/// `add_function` only rejects a name this service already declares. A
/// function inherited from an ancestor may be redeclared here, in which case
/// both appear in [`ServiceDef::get_functions`].
#[derive(Debug, Clone)]
pub struct ServiceDef {
    model:     Option<String>,
    name:      String,
    super_svc: Option<Arc<ServiceDef>>,
    functions: Vec<FunctionDef>,
    index:     HashMap<String, usize>,
    docs:      Option<Vec<String>>,
}

impl ServiceDef {
    pub fn new(
        model: Option<&str>,
        name: &str,
        super_svc: Option<Arc<ServiceDef>>,
        docs: Option<Vec<String>>,
    ) -> Self {
        ServiceDef {
            model: model.map(str::to_string),
            name: name.to_string(),
            super_svc,
            functions: Vec::new(),
            index: HashMap::new(),
            docs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qname(&self) -> String {
        match &self.model {
            Some(model) => format!("{}.{}", model, self.name),
            None => self.name.clone(),
        }
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn super_service(&self) -> Option<&Arc<ServiceDef>> {
        self.super_svc.as_ref()
    }

    pub fn doc_comments(&self) -> Option<&[String]> {
        self.docs.as_deref()
    }

    pub fn add_function(&mut self, function: FunctionDef) -> Result<(), ModelError> {
        if self.index.contains_key(&function.name) {
            return Err(ModelError::DuplicateFunction {
                name:  function.name.clone(),
                owner: self.qname(),
            });
        }
        self.index.insert(function.name.clone(), self.functions.len());
        self.functions.push(function);
        Ok(())
    }

    /// Inherited functions, root ancestor first, followed by this service's own.
    pub fn get_functions(&self) -> Vec<&FunctionDef> {
        let mut functions = match &self.super_svc {
            Some(parent) => parent.get_functions(),
            None => Vec::new(),
        };
        functions.extend(self.functions.iter());
        functions
    }

    pub fn get_defined_functions(&self) -> &[FunctionDef] {
        &self.functions
    }

    /// Looks in this service first, then up the super chain.
    pub fn get_function(&self, name: &str) -> Option<&FunctionDef> {
        match self.index.get(name) {
            Some(&i) => Some(&self.functions[i]),
            None => self.super_svc.as_ref().and_then(|parent| parent.get_function(name)),
        }
    }
}
