//! WSDL reader: the service description as the engine needs it.
//!
//! Only the slice relevant to calling the service is kept: operation names,
//! the input body element per operation with its declared parameter shape,
//! SOAP actions, and the service/port addresses. The document is expected
//! self-contained (the `singleWsdl` publication); external schema documents
//! are rejected rather than fetched.
//!
//! Parsing is deliberately lenient everywhere else. Operations whose
//! message, element, or type resolution comes up short degrade to an empty
//! parameter shape, and the payload builder falls back to passing logical
//! values through.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use paleo_core::{OperationSchema, PaleoError, ParameterElement};

use crate::soap::xml::{self, local_part, XmlNode};

/// One callable operation as the WSDL declares it.
#[derive(Debug, Clone)]
pub struct WsdlOperation {
    /// Local name of the request body element.
    pub input_element: String,
    /// Value for the `SOAPAction` header; empty when the binding declares
    /// none.
    pub soap_action: String,
    pub schema: OperationSchema,
}

#[derive(Debug, Clone)]
struct WsdlPort {
    name: String,
    address: Option<String>,
}

#[derive(Debug, Clone)]
struct WsdlService {
    name: String,
    ports: Vec<WsdlPort>,
}

#[derive(Debug, Clone)]
pub struct ServiceDescription {
    pub target_namespace: String,
    operations: BTreeMap<String, WsdlOperation>,
    services: Vec<WsdlService>,
}

impl ServiceDescription {
    pub fn parse(wsdl: &str) -> Result<Self, PaleoError> {
        let root = xml::parse(wsdl)
            .map_err(|e| PaleoError::ServiceDescription(format!("unparseable WSDL: {e:#}")))?;
        if root.name != "definitions" {
            return Err(PaleoError::ServiceDescription(format!(
                "root element is <{}>, expected <definitions>",
                root.name
            )));
        }
        reject_external_references(&root)?;

        let target_namespace = root.attr("targetNamespace").unwrap_or_default().to_string();

        // Schema catalogs: top-level element and complexType declarations,
        // merged across every inlined <schema>.
        let mut elements: HashMap<&str, &XmlNode> = HashMap::new();
        let mut complex_types: HashMap<&str, &XmlNode> = HashMap::new();
        if let Some(types) = root.child("types") {
            for schema in types.children_named("schema") {
                for child in &schema.children {
                    let Some(name) = child.attr("name") else {
                        continue;
                    };
                    match child.name.as_str() {
                        "element" => {
                            elements.insert(name, child);
                        }
                        "complexType" => {
                            complex_types.insert(name, child);
                        }
                        _ => {}
                    }
                }
            }
        }

        // message name → request body element local name
        let mut messages: HashMap<&str, &str> = HashMap::new();
        for message in root.children_named("message") {
            let Some(name) = message.attr("name") else {
                continue;
            };
            if let Some(element) = message
                .children_named("part")
                .find_map(|part| part.attr("element"))
            {
                messages.insert(name, local_part(element));
            }
        }

        // operation name → soapAction, from every binding
        let mut actions: HashMap<&str, &str> = HashMap::new();
        for binding in root.children_named("binding") {
            for operation in binding.children_named("operation") {
                let Some(name) = operation.attr("name") else {
                    continue;
                };
                if let Some(action) = operation
                    .child("operation")
                    .and_then(|soap_op| soap_op.attr("soapAction"))
                {
                    actions.insert(name, action);
                }
            }
        }

        let mut operations = BTreeMap::new();
        for port_type in root.children_named("portType") {
            for operation in port_type.children_named("operation") {
                let Some(name) = operation.attr("name") else {
                    continue;
                };
                // Document/wrapped names the body element after the
                // operation, so that is the fallback when the message
                // chain cannot be followed.
                let input_element = operation
                    .child("input")
                    .and_then(|input| input.attr("message"))
                    .map(local_part)
                    .and_then(|message| messages.get(message).copied())
                    .unwrap_or(name)
                    .to_string();
                let schema = elements
                    .get(input_element.as_str())
                    .map(|element| {
                        OperationSchema::new(parameter_elements(element, &complex_types))
                    })
                    .unwrap_or_default();
                let soap_action = actions.get(name).copied().unwrap_or_default().to_string();
                operations.insert(
                    name.to_string(),
                    WsdlOperation {
                        input_element,
                        soap_action,
                        schema,
                    },
                );
            }
        }

        let mut services = Vec::new();
        for service in root.children_named("service") {
            let name = service.attr("name").unwrap_or_default().to_string();
            let mut ports = Vec::new();
            for port in service.children_named("port") {
                ports.push(WsdlPort {
                    name: port.attr("name").unwrap_or_default().to_string(),
                    address: port
                        .child("address")
                        .and_then(|address| address.attr("location"))
                        .map(str::to_string),
                });
            }
            services.push(WsdlService { name, ports });
        }

        Ok(Self {
            target_namespace,
            operations,
            services,
        })
    }

    pub fn operation(&self, name: &str) -> Option<&WsdlOperation> {
        self.operations.get(name)
    }

    /// Every operation the description declares, for name probing and for
    /// error messages.
    pub fn operation_names(&self) -> BTreeSet<String> {
        self.operations.keys().cloned().collect()
    }

    /// Address to post calls to. With an explicit `(service, port)` pair the
    /// named port must exist and carry a SOAP address; without one, the
    /// first addressed port of the first service wins.
    pub fn resolve_endpoint(&self, binding: Option<(&str, &str)>) -> Result<&str, PaleoError> {
        if let Some((service_name, port_name)) = binding {
            let service = self
                .services
                .iter()
                .find(|service| service.name == service_name)
                .ok_or_else(|| {
                    PaleoError::ServiceDescription(format!(
                        "service '{service_name}' not found in the WSDL"
                    ))
                })?;
            let port = service
                .ports
                .iter()
                .find(|port| port.name == port_name)
                .ok_or_else(|| {
                    PaleoError::ServiceDescription(format!(
                        "port '{port_name}' not found on service '{service_name}'"
                    ))
                })?;
            return port.address.as_deref().ok_or_else(|| {
                PaleoError::ServiceDescription(format!(
                    "port '{port_name}' declares no SOAP address"
                ))
            });
        }

        self.services
            .iter()
            .flat_map(|service| service.ports.iter())
            .find_map(|port| port.address.as_deref())
            .ok_or(PaleoError::NoDefaultService)
    }
}

fn reject_external_references(node: &XmlNode) -> Result<(), PaleoError> {
    if matches!(node.name.as_str(), "import" | "include")
        && (node.attr("schemaLocation").is_some() || node.attr("location").is_some())
    {
        return Err(PaleoError::ServiceDescription(
            "the WSDL references external schema documents; publish it through the singleWsdl endpoint variant".to_string(),
        ));
    }
    for child in &node.children {
        reject_external_references(child)?;
    }
    Ok(())
}

/// Declared children of an element's content model: the inline complexType
/// wins, otherwise a `type=` reference into the named-type catalog. A type
/// reference that resolves to nothing (a primitive, or a type the document
/// never declares) yields no children.
fn declared_children<'a>(
    element: &'a XmlNode,
    complex_types: &HashMap<&str, &'a XmlNode>,
) -> Vec<&'a XmlNode> {
    let complex = element.child("complexType").or_else(|| {
        element
            .attr("type")
            .map(local_part)
            .and_then(|name| complex_types.get(name).copied())
    });
    complex
        .and_then(|complex_type| complex_type.child("sequence"))
        .map(|sequence| sequence.children_named("element").collect())
        .unwrap_or_default()
}

/// Top-level parameter elements of one operation. Matching never looks more
/// than one level down, so wrapper children are recorded as leaves.
fn parameter_elements(
    element: &XmlNode,
    complex_types: &HashMap<&str, &XmlNode>,
) -> Vec<ParameterElement> {
    declared_children(element, complex_types)
        .into_iter()
        .filter_map(|child| {
            let name = child.attr("name")?;
            let nested: Vec<ParameterElement> = declared_children(child, complex_types)
                .into_iter()
                .filter_map(|grandchild| {
                    grandchild.attr("name").map(ParameterElement::leaf)
                })
                .collect();
            Some(if nested.is_empty() {
                ParameterElement::leaf(name)
            } else {
                ParameterElement::wrapper(name, nested)
            })
        })
        .collect()
}
