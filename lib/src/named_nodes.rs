use oxigraph::model::NamedNodeRef;

/// The subset of the SHACL vocabulary the shape compiler reads.
pub struct SHACL {
    pub node_shape: NamedNodeRef<'static>,
    pub target_class: NamedNodeRef<'static>,
    pub property: NamedNodeRef<'static>,
    pub path: NamedNodeRef<'static>,
    pub name: NamedNodeRef<'static>,
    pub description: NamedNodeRef<'static>,
    pub class: NamedNodeRef<'static>,
    pub datatype: NamedNodeRef<'static>,
    pub min_count: NamedNodeRef<'static>,
    pub max_count: NamedNodeRef<'static>,
    pub inverse_path: NamedNodeRef<'static>,
    pub alternative_path: NamedNodeRef<'static>,
    pub zero_or_more_path: NamedNodeRef<'static>,
    pub one_or_more_path: NamedNodeRef<'static>,
    pub zero_or_one_path: NamedNodeRef<'static>,
}

impl SHACL {
    pub fn new() -> Self {
        SHACL {
            node_shape: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#NodeShape"),
            target_class: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#targetClass"),
            property: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#property"),
            path: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#path"),
            name: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#name"),
            description: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#description"),
            class: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#class"),
            datatype: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#datatype"),
            min_count: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#minCount"),
            max_count: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#maxCount"),
            inverse_path: NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#inversePath"),
            alternative_path: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#alternativePath",
            ),
            zero_or_more_path: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#zeroOrMorePath",
            ),
            one_or_more_path: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#oneOrMorePath",
            ),
            zero_or_one_path: NamedNodeRef::new_unchecked(
                "http://www.w3.org/ns/shacl#zeroOrOnePath",
            ),
        }
    }
}

pub struct RDF {
    pub type_: NamedNodeRef<'static>,
    pub first: NamedNodeRef<'static>,
    pub rest: NamedNodeRef<'static>,
    pub nil: NamedNodeRef<'static>,
}

impl RDF {
    pub fn new() -> Self {
        RDF {
            type_: NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
            first: NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#first"),
            rest: NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#rest"),
            nil: NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#nil"),
        }
    }
}

pub struct RDFS {
    pub sub_class_of: NamedNodeRef<'static>,
}

impl RDFS {
    pub fn new() -> Self {
        RDFS {
            sub_class_of: NamedNodeRef::new_unchecked(
                "http://www.w3.org/2000/01/rdf-schema#subClassOf",
            ),
        }
    }
}

pub struct XSD {
    pub string: NamedNodeRef<'static>,
    pub boolean: NamedNodeRef<'static>,
    pub integer: NamedNodeRef<'static>,
    pub int: NamedNodeRef<'static>,
    pub long: NamedNodeRef<'static>,
    pub short: NamedNodeRef<'static>,
    pub non_negative_integer: NamedNodeRef<'static>,
    pub positive_integer: NamedNodeRef<'static>,
    pub float: NamedNodeRef<'static>,
    pub double: NamedNodeRef<'static>,
    pub decimal: NamedNodeRef<'static>,
    pub date_time: NamedNodeRef<'static>,
}

impl XSD {
    pub fn new() -> Self {
        XSD {
            string: NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#string"),
            boolean: NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#boolean"),
            integer: NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#integer"),
            int: NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#int"),
            long: NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#long"),
            short: NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#short"),
            non_negative_integer: NamedNodeRef::new_unchecked(
                "http://www.w3.org/2001/XMLSchema#nonNegativeInteger",
            ),
            positive_integer: NamedNodeRef::new_unchecked(
                "http://www.w3.org/2001/XMLSchema#positiveInteger",
            ),
            float: NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#float"),
            double: NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#double"),
            decimal: NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#decimal"),
            date_time: NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#dateTime"),
        }
    }
}

/// Extension vocabulary: environment-backed values and the built-in lenses
/// that can be referenced from `sh:class`.
pub struct RDFL {
    pub env_variable: NamedNodeRef<'static>,
    pub env_key: NamedNodeRef<'static>,
    pub env_default: NamedNodeRef<'static>,
    pub cbd: NamedNodeRef<'static>,
    pub path_lens: NamedNodeRef<'static>,
    pub context: NamedNodeRef<'static>,
    pub typed_extract: NamedNodeRef<'static>,
}

impl RDFL {
    pub fn new() -> Self {
        RDFL {
            env_variable: NamedNodeRef::new_unchecked(
                "https://w3id.org/rdf-lens/ontology#EnvVariable",
            ),
            env_key: NamedNodeRef::new_unchecked("https://w3id.org/rdf-lens/ontology#envKey"),
            env_default: NamedNodeRef::new_unchecked(
                "https://w3id.org/rdf-lens/ontology#envDefault",
            ),
            cbd: NamedNodeRef::new_unchecked("https://w3id.org/rdf-lens/ontology#CBD"),
            path_lens: NamedNodeRef::new_unchecked("https://w3id.org/rdf-lens/ontology#PathLens"),
            context: NamedNodeRef::new_unchecked("https://w3id.org/rdf-lens/ontology#Context"),
            typed_extract: NamedNodeRef::new_unchecked(
                "https://w3id.org/rdf-lens/ontology#TypedExtract",
            ),
        }
    }
}
