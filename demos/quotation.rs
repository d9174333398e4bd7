use chrono::{Duration, Local};
use cotiza::{render_quote_numbered, LineItem, MemorySequence, QuoteData};

fn main() {
    let today = Local::now().date_naive();

    let quote = QuoteData {
        company: "Mi Empresa".to_string(),
        subtitle: "Soluciones de Calidad".to_string(),
        title: "Cotización".to_string(),
        sequence_number: String::new(), // stamped by the counter
        issue_date: Some(today),
        due_date: Some(today + Duration::days(7)),
        client: "Juan Pérez".to_string(),
        address: "Calle Ejemplo 123\nCiudad".to_string(),
        phone: "+56 9 9876 5432".to_string(),
        tax_id: "12345678-9".to_string(),
        email: "contacto@miempresa.cl".to_string(),
        project: "Desarrollo Web".to_string(),
        description: lipsum::lipsum(80),
        discount_percent: 10,
        items: vec![
            LineItem {
                number: "1".to_string(),
                description: "Hosting Anual".to_string(),
                price: "120000".to_string(),
                quantity: "1".to_string(),
            },
            LineItem {
                number: "2".to_string(),
                description: "Dominio (.cl)".to_string(),
                price: "15000".to_string(),
                quantity: "1".to_string(),
            },
        ],
    };

    let mut counter = MemorySequence::new();
    let bytes = render_quote_numbered(&quote, &mut counter).expect("can render quotation");

    std::fs::write("cotizacion.pdf", &bytes).unwrap();
    println!("wrote cotizacion.pdf ({} bytes)", bytes.len());
}
