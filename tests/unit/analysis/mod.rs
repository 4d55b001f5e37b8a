pub mod quantizer;
