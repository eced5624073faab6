pub enum Command {
    List {
        filters: Vec<(String, String)>,
    },
    Add {
        lon: f64,
        lat: f64,
        properties: Vec<(String, String)>,
    },
    Update {
        id: String,
        set: Vec<(String, String)>,
    },
    Delete {
        id: String,
    },
    Keys,
    // Value frequencies; empty means the default field set
    Analyze {
        fields: Vec<String>,
    },
}
